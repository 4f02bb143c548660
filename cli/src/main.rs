//! Keysweep CLI
//!
//! Self-test, one-off key recovery and device listing.

mod commands;
mod telemetry;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use commands::{list_devices, run_search, run_selftest, SearchArgs, SelfTestArgs};
use keysweep::{BackendPreference, SearchConfig};
use std::path::PathBuf;

// =============================================================================
// CLI DEFINITION
// =============================================================================

#[derive(Parser)]
#[command(name = "keysweep")]
#[command(about = "Exhaustive parallel DES key recovery", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    engine: EngineArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Recover a random key end to end (default)
    Selftest(SelfTestArgs),
    /// Recover the unknown low bits of a key
    Search(SearchArgs),
    /// List compute backends and OpenCL devices
    Devices,
}

/// Engine options shared by all commands (override `KEYSWEEP_*`).
#[derive(Args)]
struct EngineArgs {
    /// Backend: auto, portable or opencl
    #[arg(long, global = true, value_parser = parse_backend)]
    backend: Option<BackendPreference>,

    /// OpenCL kernel source file (default: embedded kernel)
    #[arg(long, global = true, value_name = "FILE")]
    kernel: Option<PathBuf>,

    /// Preferred work-group size
    #[arg(long, global = true)]
    group_size: Option<usize>,

    /// Portable worker threads (0 = one per CPU)
    #[arg(long, global = true)]
    threads: Option<usize>,
}

impl EngineArgs {
    fn apply(self, mut config: SearchConfig) -> SearchConfig {
        if let Some(backend) = self.backend {
            config.backend = backend;
        }
        if let Some(kernel) = self.kernel {
            config.kernel_path = Some(kernel);
        }
        if let Some(group_size) = self.group_size.filter(|&g| g > 0) {
            config.group_size = group_size;
        }
        if let Some(threads) = self.threads {
            config.threads = threads;
        }
        config
    }
}

fn parse_backend(name: &str) -> Result<BackendPreference, String> {
    BackendPreference::from_name(name)
        .ok_or_else(|| format!("unknown backend '{name}' (expected auto, portable or opencl)"))
}

// =============================================================================
// ENTRY POINT
// =============================================================================

fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init_tracing()?;

    let config = cli.engine.apply(SearchConfig::from_env());

    let passed = match cli.command {
        None => run_selftest(&SelfTestArgs::default(), config)?,
        Some(Commands::Selftest(args)) => run_selftest(&args, config)?,
        Some(Commands::Search(args)) => run_search(&args, config)?,
        Some(Commands::Devices) => {
            list_devices(&config);
            true
        }
    };

    if !passed {
        std::process::exit(1);
    }

    Ok(())
}
