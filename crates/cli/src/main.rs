//! RV32I out-of-order simulator CLI.
//!
//! Loads a program image (from a file argument or stdin), runs it to the
//! termination sentinel, and prints `reg[a0] & 0xFF` as a single decimal
//! line on stdout. Everything else (trace, statistics, errors) goes to
//! stderr.

use clap::Parser;
use std::fs;
use std::process;

use rv32_core::config::Config;
use rv32_core::core::Processor;
use rv32_core::sim::ProgramImage;

#[derive(Parser, Debug)]
#[command(
    name = "sim",
    author,
    version,
    about = "RV32I out-of-order (Tomasulo) cycle simulator",
    long_about = "Runs a textual program image (@HEXADDR directives followed by \
hex byte lines) on a cycle-accurate out-of-order RV32I core and prints the low \
eight bits of a0 when the program terminates.\n\nExamples:\n  \
sim program.data\n  sim < program.data\n  sim --stats --config sim.json program.data"
)]
struct Cli {
    /// Program image path; stdin is used when omitted.
    image: Option<String>,

    /// JSON configuration file (capacities, latency, cycle cap).
    #[arg(long)]
    config: Option<String>,

    /// Print per-stage trace lines to stderr.
    #[arg(long)]
    trace: bool,

    /// Print run statistics to stderr on exit.
    #[arg(long)]
    stats: bool,
}

fn main() {
    let cli = Cli::parse();

    let mut config = match cli.config {
        Some(path) => load_config(&path),
        None => Config::default(),
    };
    if cli.trace {
        config.trace = true;
    }

    let image = match cli.image {
        Some(path) => ProgramImage::from_file(&path),
        None => ProgramImage::from_stdin(),
    };
    let image = image.unwrap_or_else(|e| {
        eprintln!("error: {}", e);
        process::exit(1);
    });

    let mut processor = Processor::new(image, &config);
    match processor.run() {
        Ok(exit) => {
            if cli.stats {
                processor.stats.print();
            }
            println!("{}", exit);
        }
        Err(e) => {
            eprintln!("error: {}", e);
            if cli.stats {
                processor.stats.print();
            }
            process::exit(1);
        }
    }
}

/// Reads and deserializes a JSON configuration file.
fn load_config(path: &str) -> Config {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("error: could not read config '{}': {}", path, e);
        process::exit(1);
    });
    serde_json::from_str(&text).unwrap_or_else(|e| {
        eprintln!("error: bad config '{}': {}", path, e);
        process::exit(1);
    })
}
