use snapcodec::utils::varint::{decode, encode, MAX_VARINT_LEN};
use snapcodec::Error;

#[test]
fn test_varint_round_trip() {
    fn test_round_trip(num: u32, expected_len: usize) {
        let mut buffer = Vec::new();
        let wrote = encode(num, &mut buffer);
        assert_eq!(buffer.len(), wrote);
        assert_eq!(wrote, expected_len);
        assert_eq!(decode(&buffer), Ok((wrote, num)));
    }

    test_round_trip(0, 1);
    test_round_trip(1, 1);
    test_round_trip(127, 1);
    test_round_trip(128, 2);
    test_round_trip(16383, 2);
    test_round_trip(16384, 3);
    test_round_trip(1 << 21, 4);
    test_round_trip(1 << 28, 5);
    test_round_trip(u32::MAX, MAX_VARINT_LEN);
}

#[test]
fn test_varint_trailing_bytes() {
    // Only the varint itself is consumed.
    assert_eq!(decode(&[0xac, 0x02, 0xff, 0xff]), Ok((2, 300)));
}

#[test]
fn test_varint_malformed() {
    assert_eq!(decode(&[]), Err(Error::BadVarint));
    assert_eq!(decode(&[0x80]), Err(Error::BadVarint));
    assert_eq!(decode(&[0xff, 0xff]), Err(Error::BadVarint));
    // The fifth byte must not continue.
    assert_eq!(decode(&[0x80, 0x80, 0x80, 0x80, 0x80, 0x00]), Err(Error::BadVarint));
    // The fifth byte must not overflow 32 bits.
    assert_eq!(decode(&[0xff, 0xff, 0xff, 0xff, 0x1f]), Err(Error::BadVarint));
}
