//! Program image format tests.
//!
//! The loader's text format exercised through real files (via `tempfile`)
//! and through full pipeline runs.

use std::io::Write;

use tempfile::NamedTempFile;

use crate::common::encode::*;
use rv32_core::config::Config;
use rv32_core::core::Processor;
use rv32_core::sim::ProgramImage;

/// Writes image text to a temp file.
fn image_file(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(text.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn words_to_lines(words: &[u32]) -> String {
    let mut text = String::new();
    for word in words {
        for byte in word.to_le_bytes() {
            text.push_str(&format!("{:02x} ", byte));
        }
        text.push('\n');
    }
    text
}

#[test]
fn test_run_image_from_file() {
    let text = format!("@0\n{}", words_to_lines(&[addi(10, 0, 7), halt()]));
    let file = image_file(&text);

    let image = ProgramImage::from_file(file.path()).unwrap();
    let mut cpu = Processor::new(image, &Config::default());
    assert_eq!(cpu.run().unwrap(), 7);
}

#[test]
fn test_image_with_data_section_and_blank_lines() {
    let code = words_to_lines(&[lui(5, 1), lw(10, 5, 0), halt()]);
    let text = format!("@0\n{}\n\n@1000\n2A 00 00 00\n", code);
    let file = image_file(&text);

    let image = ProgramImage::from_file(file.path()).unwrap();
    let mut cpu = Processor::new(image, &Config::default());
    assert_eq!(cpu.run().unwrap(), 42);
}

#[test]
fn test_image_mixed_case_hex() {
    let file = image_file("@0\nEf be aD de\n");
    let image = ProgramImage::from_file(file.path()).unwrap();
    assert_eq!(image.fetch_word(0), Some(0xDEAD_BEEF));
}

#[test]
fn test_image_many_bytes_per_line() {
    let words = [addi(10, 0, 5), halt()];
    let mut line = String::from("@0\n");
    for word in words {
        for byte in word.to_le_bytes() {
            line.push_str(&format!("{:02x} ", byte));
        }
    }
    line.push('\n');
    let file = image_file(&line);

    let image = ProgramImage::from_file(file.path()).unwrap();
    let mut cpu = Processor::new(image, &Config::default());
    assert_eq!(cpu.run().unwrap(), 5);
}

#[test]
fn test_malformed_image_reports_line() {
    let file = image_file("@0\n13 05\nnot hex\n");
    let err = ProgramImage::from_file(file.path()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "loader: line 3: bad byte 'not'".to_string()
    );
}

#[test]
fn test_unreadable_file_is_loader_error() {
    let err = ProgramImage::from_file("/definitely/not/here.data").unwrap_err();
    assert!(err.to_string().starts_with("loader:"));
}
