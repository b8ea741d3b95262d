//! Alpha AXP system emulator CLI.
//!
//! This binary provides the entry point for running guest images. It performs:
//! 1. **Image run:** Load an ELF or flat binary and execute to halt or an
//!    instruction limit.
//! 2. **Configuration:** Built-in defaults, overridable from a JSON file and
//!    per-flag switches (CPU count, reset vector).
//! 3. **Reporting:** Per-CPU statistics and optional register dumps, with
//!    `tracing` diagnostics controlled by `RUST_LOG`.

use clap::{Parser, Subcommand};
use std::process::ExitCode;

use axp_core::config::Config;
use axp_core::sim::loader;
use axp_core::sim::machine::Machine;
use axp_core::soc::devices::{Console, Device};

/// Conventional console MMIO base for bare-metal test programs.
const CONSOLE_BASE: u64 = 0x1_0000_0000;
/// Console register window size.
const CONSOLE_SIZE: u64 = 0x100;

#[derive(Parser, Debug)]
#[command(
    name = "axpsim",
    author,
    version,
    about = "Alpha AXP system emulator",
    long_about = "Run an Alpha guest image on an emulated SMP machine.\n\nExamples:\n  axpsim run -f guest.elf\n  axpsim run -f flat.bin --base 0x10000 --cpus 4 --limit 1000000"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a guest image until every CPU halts or the limit is reached.
    Run {
        /// Image to execute (ELF or flat binary).
        #[arg(short, long)]
        file: String,

        /// JSON configuration file; defaults apply when omitted.
        #[arg(short, long)]
        config: Option<String>,

        /// Load address and entry point for flat images.
        #[arg(long, default_value_t = 0, value_parser = parse_u64)]
        base: u64,

        /// Number of CPUs (overrides the configuration).
        #[arg(long)]
        cpus: Option<usize>,

        /// Per-CPU retired-instruction limit.
        #[arg(long, default_value_t = 100_000_000)]
        limit: u64,

        /// Dump integer registers of every CPU at exit.
        #[arg(long)]
        dump_regs: bool,
    },
}

fn parse_u64(text: &str) -> Result<u64, String> {
    let trimmed = text.trim();
    let parsed = trimmed
        .strip_prefix("0x")
        .map_or_else(|| trimmed.parse(), |hex| u64::from_str_radix(hex, 16));
    parsed.map_err(|e| format!("invalid address '{text}': {e}"))
}

fn load_config(path: Option<&str>) -> Result<Config, String> {
    match path {
        None => Ok(Config::default()),
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("cannot read config '{path}': {e}"))?;
            Config::from_json(&text).map_err(|e| format!("cannot parse config '{path}': {e}"))
        }
    }
}

fn run(
    file: &str,
    config_path: Option<&str>,
    base: u64,
    cpus: Option<usize>,
    limit: u64,
    dump_regs: bool,
) -> Result<(), String> {
    let mut config = load_config(config_path)?;
    if let Some(cpus) = cpus {
        config.general.num_cpus = cpus.max(1);
    }

    let image = std::fs::read(file).map_err(|e| format!("cannot read image '{file}': {e}"))?;

    let console: Box<dyn Device> = Box::new(Console::new());
    let mut machine = Machine::builder(config)
        .with_device(console, CONSOLE_BASE, CONSOLE_SIZE)
        .map_err(|e| e.to_string())?
        .build();

    let entry = loader::load_image(machine.phys(), &image, base).map_err(|e| e.to_string())?;
    for idx in 0..machine.num_cpus() {
        machine.cpu_mut(idx).set_pc(entry);
    }

    tracing::info!(
        entry = format_args!("{entry:#x}"),
        cpus = machine.num_cpus(),
        "starting machine"
    );
    machine.start_all();
    let retired = machine.run(limit);

    let output = machine
        .bus()
        .with_device("CONSOLE", |dev| {
            dev.as_console_mut().map(Console::take_output)
        })
        .flatten()
        .unwrap_or_default();
    if !output.is_empty() {
        print!("{}", String::from_utf8_lossy(&output));
    }

    for idx in 0..machine.num_cpus() {
        let cpu = machine.cpu(idx);
        cpu.stats_snapshot().report(idx);
        eprintln!("cpu{idx}: state {:?} after {} instructions", cpu.state, retired[idx]);
        if dump_regs {
            cpu.dump_state();
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Run {
            file,
            config,
            base,
            cpus,
            limit,
            dump_regs,
        } => run(&file, config.as_deref(), base, cpus, limit, dump_regs),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}
