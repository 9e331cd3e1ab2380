//! Vector-thread simulator CLI.
//!
//! This binary is the single entry point for running programs on the
//! simulator. It performs:
//! 1. **Configuration:** Built-in defaults or a JSON configuration file.
//! 2. **Loading:** Places a flat binary image in physical memory and
//!    starts hart 0 at the entry address.
//! 3. **Execution:** Slices the run loop until every hart halts, with an
//!    optional retirement bound.

use clap::{Parser, Subcommand};
use std::process;

use vtsim_core::sim::loader;
use vtsim_core::{Config, Simulator};

#[derive(Parser, Debug)]
#[command(
    name = "vtsim",
    author,
    version,
    about = "Vector-thread RISC instruction-set simulator",
    long_about = "Run a flat binary image on the simulator.\n\nConfiguration comes from built-in defaults or a JSON file.\n\nExamples:\n  vtsim run -f prog.bin\n  vtsim run -f prog.bin --entry 0x1000 --trace\n  vtsim run -f prog.bin --config sim.json --max-slices 100000"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a flat binary image.
    Run {
        /// Binary image to execute.
        #[arg(short, long)]
        file: String,

        /// Load/entry address (decimal or 0x-prefixed hex).
        #[arg(long, default_value = "0", value_parser = parse_addr)]
        entry: u64,

        /// JSON configuration file.
        #[arg(long)]
        config: Option<String>,

        /// Emit a disassembly line per retired instruction.
        #[arg(long)]
        trace: bool,

        /// Stop after this many scheduling slices even if harts still run.
        #[arg(long)]
        max_slices: Option<u64>,
    },
}

/// Parses a decimal or `0x`-prefixed address argument.
fn parse_addr(s: &str) -> Result<u64, String> {
    let parsed = if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u64::from_str_radix(hex, 16)
    } else {
        s.parse()
    };
    parsed.map_err(|e| format!("invalid address {:?}: {}", s, e))
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            file,
            entry,
            config,
            trace,
            max_slices,
        } => cmd_run(file, entry, config, trace, max_slices),
    }
}

/// Loads the image, starts hart 0, and slices the run loop to completion.
fn cmd_run(
    file: String,
    entry: u64,
    config_path: Option<String>,
    trace: bool,
    max_slices: Option<u64>,
) {
    let mut config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("error reading config {}: {}", path, e);
                process::exit(1);
            });
            serde_json::from_str::<Config>(&text).unwrap_or_else(|e| {
                eprintln!("error parsing config {}: {}", path, e);
                process::exit(1);
            })
        }
        None => Config::default(),
    };
    if trace {
        config.general.trace = true;
    }

    let image = loader::load_binary(&file).unwrap_or_else(|e| {
        eprintln!("error reading {}: {}", file, e);
        process::exit(1);
    });

    println!(
        "[*] {} ({} bytes) at {:#x}, {} hart(s), {} MiB memory",
        file,
        image.len(),
        entry,
        config.general.nharts,
        config.memory.memsz / 1024 / 1024
    );

    let mut sim = Simulator::new(&config);
    sim.load_binary_at(&image, entry);
    sim.start(entry);

    let mut slices: u64 = 0;
    while sim.step_all() {
        slices += 1;
        if let Some(bound) = max_slices {
            if slices >= bound {
                eprintln!("[!] slice bound reached with harts still running");
                break;
            }
        }
    }

    for idx in 0..sim.nharts() {
        let hart = sim.hart(idx);
        println!(
            "core {:3}: halted, {} instructions retired, tohost {:#x}",
            idx, hart.state.cycle, hart.state.tohost
        );
    }
}
