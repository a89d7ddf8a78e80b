//! This is the command line tool that loads an input file and either
//! compresses, decompresses or inspects it.

extern crate clap;
extern crate env_logger;
extern crate log;

use clap::{Arg, ArgAction, Command};
use snapcodec::utils::signatures::FILE_EXTENSION;
use snapcodec::{compress, is_valid_compressed, uncompress, uncompressed_length};

use std::{fs, time::Instant};
use std::{fs::File, io::Write};

fn save_file(data: &[u8], path: &str) -> std::io::Result<()> {
    let mut f = File::create(path)?;
    f.write_all(data)?;
    log::info!("Wrote {}.", &path);
    Ok(())
}

/// A scoped utility struct for measuring and reporting time.
struct Timer {
    start: std::time::Instant,
}

impl Timer {
    fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let now = Instant::now();
        if let Some(duration) = now.checked_duration_since(self.start) {
            log::info!(
                "Operation completed in {:03} seconds",
                duration.as_secs_f32()
            );
        }
    }
}

/// Pick the output path for 'input_path' when the user didn't give one.
/// Compressed files get the extension. Decompressed files lose it, or get
/// '.out' if the input has no extension to strip, so the output never
/// replaces the input.
fn default_output_path(input_path: &str, is_compress: bool) -> String {
    if is_compress {
        return format!("{}{}", input_path, FILE_EXTENSION);
    }
    match input_path.strip_suffix(FILE_EXTENSION) {
        Some(stem) if !stem.is_empty() => stem.to_string(),
        _ => format!("{}.out", input_path),
    }
}

/// Compress or decompress 'input'. Returns the new buffer, or None after
/// reporting the failure.
fn handle_buffer(is_compress: bool, input: &[u8]) -> Option<Vec<u8>> {
    let res = if is_compress {
        compress(input)
    } else {
        uncompress(input)
    };
    match res {
        Ok(buffer) => Some(buffer),
        Err(err) => {
            log::error!("{}", err);
            None
        }
    }
}

fn main() {
    let matches = Command::new("snapcodec")
        .version("0.1")
        .arg(
            Arg::new("checked")
                .long("check")
                .help("Verify that the compressed output decompresses")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("decompress")
                .short('d')
                .long("decompress")
                .help("Decompress the input")
                .action(ArgAction::SetTrue)
                .conflicts_with("compress"),
        )
        .arg(
            Arg::new("compress")
                .short('c')
                .long("compress")
                .help("Compress the input")
                .conflicts_with("decompress")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("length")
                .long("length")
                .help("Print the uncompressed length of a compressed input")
                .conflicts_with_all(["compress", "decompress"])
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("validate")
                .long("validate")
                .help("Check whether the input is a valid compressed block")
                .conflicts_with_all(["compress", "decompress"])
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Path of the output file")
                .num_args(1),
        )
        .arg(
            Arg::new("INPUT")
                .help("Sets the input file to use")
                .required(true)
                .index(1),
        )
        .get_matches();

    env_logger::builder().format_timestamp(None).init();

    let mut cli_compress = matches.get_flag("compress");
    let cli_decompress = matches.get_flag("decompress");
    let cli_checked_mode = matches.get_flag("checked");
    let cli_output_path = matches.get_one::<String>("output").cloned();

    let Some(input_path) = matches.get_one::<String>("INPUT") else {
        return;
    };
    let input = match fs::read(input_path) {
        Ok(input) => input,
        Err(err) => {
            log::error!("Can't open {}: {}", input_path, err);
            std::process::exit(1);
        }
    };

    if matches.get_flag("length") {
        match uncompressed_length(&input) {
            Ok(len) => println!("{}", len),
            Err(err) => {
                log::error!("{}", err);
                std::process::exit(1);
            }
        }
        return;
    }

    if matches.get_flag("validate") {
        let valid = is_valid_compressed(&input);
        println!("{}", valid);
        if !valid {
            std::process::exit(1);
        }
        return;
    }

    // The user did not specify if this is compress of decompress. Try to figure
    // out using the extension.
    let ends_with_ext = input_path.ends_with(FILE_EXTENSION);
    if !cli_compress && !cli_decompress && !ends_with_ext {
        cli_compress = true;
    }

    // Come up with a file name.
    let out = cli_output_path
        .unwrap_or_else(|| default_output_path(input_path, cli_compress));
    let timer = Timer::new();

    let Some(dest) = handle_buffer(cli_compress, &input) else {
        if cli_compress {
            log::info!("Compression failed");
        } else {
            log::info!("Decompression failed");
        }
        std::process::exit(1);
    };

    if cli_compress {
        let (from, to) = (input.len(), dest.len());
        log::info!("Compressed from {} to {} bytes.", from, to);
        log::info!("Compression ratio is {:.4}x.", from as f64 / to as f64);

        if cli_checked_mode {
            match handle_buffer(false, &dest) {
                Some(decoded) if decoded == input => log::info!("Correct!"),
                Some(_) => log::info!("Incorrect!"),
                None => log::info!("Could not decompress the file!"),
            }
        }
    } else {
        log::info!("Decompressed from {} to {} bytes.", input.len(), dest.len());
    }

    if let Err(err) = save_file(&dest, &out) {
        log::error!("Unable to write {}: {}", out, err);
        std::process::exit(1);
    }

    drop(timer);
}

#[test]
fn test_default_output_path() {
    assert_eq!(default_output_path("data.bin", true), "data.bin.snappy");
    assert_eq!(default_output_path("data.bin.snappy", false), "data.bin");

    // Forcing a direction must not reuse the input name.
    assert_eq!(default_output_path("a.snappy", true), "a.snappy.snappy");
    assert_eq!(default_output_path("data.bin", false), "data.bin.out");
    assert_eq!(default_output_path(".snappy", false), ".snappy.out");
}
