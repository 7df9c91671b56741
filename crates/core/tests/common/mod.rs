pub mod encode;

use std::io::Cursor;

use rv32_core::config::Config;
use rv32_core::core::Processor;
use rv32_core::sim::ProgramImage;

/// Builds the textual image format from instruction words at address 0 plus
/// optional (address, word) data sections.
pub fn image_text(words: &[u32], data: &[(u32, u32)]) -> String {
    let mut text = String::from("@0\n");
    for word in words {
        for byte in word.to_le_bytes() {
            text.push_str(&format!("{:02X} ", byte));
        }
        text.push('\n');
    }
    for (addr, word) in data {
        text.push_str(&format!("@{:X}\n", addr));
        for byte in word.to_le_bytes() {
            text.push_str(&format!("{:02X} ", byte));
        }
        text.push('\n');
    }
    text
}

/// Builds a processor over a program, going through the real image loader.
pub fn processor(words: &[u32], data: &[(u32, u32)]) -> Processor {
    processor_with_config(words, data, &Config::default())
}

/// Builds a processor with an explicit configuration.
pub fn processor_with_config(words: &[u32], data: &[(u32, u32)], config: &Config) -> Processor {
    let _ = env_logger::builder().is_test(true).try_init();
    let image = ProgramImage::from_reader(Cursor::new(image_text(words, data))).unwrap();
    Processor::new(image, config)
}

/// Runs a program to termination and returns its exit value.
pub fn run_program(words: &[u32]) -> u8 {
    processor(words, &[]).run().unwrap()
}

/// Runs a program with data sections and returns its exit value.
pub fn run_program_with_data(words: &[u32], data: &[(u32, u32)]) -> u8 {
    processor(words, data).run().unwrap()
}
