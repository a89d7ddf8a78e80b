//! This module implements the single-pass hash matcher used by the block
//! encoder.
use std::ops::Range;

use crate::block::MAX_INPUT_LEN;

/// Used to mark empty cells.
const EMPTY_CELL: u32 = 0xffffffff;
/// The minimum size of the match word.
pub const MIN_MATCH: usize = 4;
/// Bounds on the size of the hash table (1<<x).
const MIN_TABLE_BITS: u32 = 8;
const MAX_TABLE_BITS: u32 = 14;
/// The initial value of the skip counter. The scan stride is 'skip >> 5', so
/// the first 32 failed lookups check every byte.
const SKIP_START: usize = 32;

/// Maps the fingerprint of a 4-byte window to the most recent position where
/// it was seen. Entries are overwritten, never chained.
struct HashTable {
    /// The table cells.
    cells: Vec<u32>,
    /// Shift that keeps the top 'bits' of the multiplied fingerprint.
    shift: u32,
}

impl HashTable {
    /// Create a table that is large enough for an input of 'len' bytes.
    fn with_input_len(len: usize) -> Self {
        let mut bits = MIN_TABLE_BITS;
        while bits < MAX_TABLE_BITS && (1usize << bits) < len {
            bits += 1;
        }
        Self {
            cells: vec![EMPTY_CELL; 1 << bits],
            shift: 32 - bits,
        }
    }

    fn hash_to_index(&self, val: u32) -> usize {
        (val.wrapping_mul(0x1e35a7bd) >> self.shift) as usize
    }

    /// Return the previous position stored for 'val' and replace it with
    /// 'pos'.
    fn swap(&mut self, val: u32, pos: usize) -> Option<usize> {
        let idx = self.hash_to_index(val);
        let prev = self.cells[idx];
        self.cells[idx] = pos as u32;
        if prev == EMPTY_CELL {
            None
        } else {
            Some(prev as usize)
        }
    }

    fn insert(&mut self, val: u32, pos: usize) {
        let idx = self.hash_to_index(val);
        self.cells[idx] = pos as u32;
    }

    /// Returns the number of cells in the table.
    fn len(&self) -> usize {
        self.cells.len()
    }
}

/// A greedy Lempel–Ziv matcher backed by a single-entry hash table.
/// The matcher is an iterator that returns pairs of (literal, match) regions.
/// The match region is the source of the copy, so the copy distance is
/// 'lit.end - mat.start'. The last pair may have an empty match.
/// Positions are stored as u32. The last position of the largest input is
/// u32::MAX - 1, so it never collides with 'EMPTY_CELL'.
pub struct HashMatchFinder<'a> {
    /// The input to tokenize.
    input: &'a [u8],
    /// The fingerprint table.
    table: HashTable,
    /// The iterator location in the input.
    cursor: usize,
}

impl<'a> HashMatchFinder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        debug_assert!(input.len() <= MAX_INPUT_LEN, "Input too large");
        Self {
            input,
            table: HashTable::with_input_len(input.len()),
            cursor: 0,
        }
    }

    /// Returns the number of cells in the hash table.
    pub fn table_size(&self) -> usize {
        self.table.len()
    }

    fn get_bytes_at(&self, idx: usize) -> u32 {
        let b = &self.input[idx..idx + 4];
        u32::from_le_bytes([b[0], b[1], b[2], b[3]])
    }

    /// Return the length of the common run that starts at 'a' and 'b'.
    /// The index 'a' must come before 'b'. The run may overlap 'b'.
    fn get_match_length(&self, a: usize, b: usize) -> usize {
        debug_assert!(a < b, "Pointer b must come after pointer a");
        let tail = &self.input[b..];
        let head = &self.input[a..a + tail.len()];
        head.iter().zip(tail).take_while(|(x, y)| x == y).count()
    }

    /// Return the next literal and match regions. The indices in the regions
    /// are absolute from the beginning of the stream.
    fn get_next_match_region(
        &mut self,
    ) -> Option<(Range<usize>, Range<usize>)> {
        let input_len = self.input.len();
        if self.cursor == input_len {
            return None;
        }

        let lit_start = self.cursor;
        let mut skip = SKIP_START;

        while self.cursor + MIN_MATCH <= input_len {
            let word = self.get_bytes_at(self.cursor);
            let candidate = self.table.swap(word, self.cursor);

            if let Some(cand) = candidate {
                if self.get_bytes_at(cand) == word {
                    let len = self.get_match_length(cand, self.cursor);
                    debug_assert!(len >= MIN_MATCH);

                    let lit = lit_start..self.cursor;
                    self.cursor += len;

                    // Index the last window of the match, so that the next
                    // scan can continue a repeating run.
                    let last = self.cursor - 1;
                    if last + MIN_MATCH <= input_len {
                        let word = self.get_bytes_at(last);
                        self.table.insert(word, last);
                    }
                    return Some((lit, cand..cand + len));
                }
            }

            // Speed up over regions that don't compress.
            self.cursor += skip >> 5;
            skip += 1;
        }

        // We are close to the end of the buffer. The rest is literals.
        self.cursor = input_len;
        Some((lit_start..input_len, 0..0))
    }
}

/// Implement the iterator trait for the matcher.
impl<'a> Iterator for HashMatchFinder<'a> {
    type Item = (Range<usize>, Range<usize>);

    fn next(&mut self) -> Option<(Range<usize>, Range<usize>)> {
        self.get_next_match_region()
    }
}

#[test]
fn test_table_size() {
    assert_eq!(HashMatchFinder::new(&[]).table_size(), 256);
    assert_eq!(HashMatchFinder::new(&[0; 300]).table_size(), 512);
    assert_eq!(HashMatchFinder::new(&[0; 100_000]).table_size(), 1 << 14);
}

#[test]
fn test_positions_fit_below_empty_cell() {
    let last_position = (MAX_INPUT_LEN - 1) as u64;
    assert!(last_position < EMPTY_CELL as u64);

    // Storing the largest position keeps the cell occupied.
    let mut table = HashTable::with_input_len(0);
    table.insert(7, MAX_INPUT_LEN - 1);
    assert_eq!(table.swap(7, 0), Some(MAX_INPUT_LEN - 1));
}
