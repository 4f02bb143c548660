//! Self-Test Command
//!
//! Generates random keys, hides their low bits and recovers them.

use anyhow::{Context, Result};
use clap::Args;
use keysweep::selftest::DEFAULT_UNKNOWN_BITS;
use keysweep::{SearchConfig, SelfTest, Searcher};

#[derive(Args)]
pub struct SelfTestArgs {
    /// Number of unknown low key bits
    #[arg(long, default_value_t = DEFAULT_UNKNOWN_BITS)]
    bits: u32,

    /// Fixture seed (round `i` uses `seed + i`)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of rounds (at least 1)
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    rounds: u32,
}

impl Default for SelfTestArgs {
    fn default() -> Self {
        Self {
            bits: DEFAULT_UNKNOWN_BITS,
            seed: None,
            rounds: 1,
        }
    }
}

// =============================================================================
// SELF-TEST
// =============================================================================

/// Run the self-test rounds. Returns whether every round passed.
pub fn run_selftest(args: &SelfTestArgs, config: SearchConfig) -> Result<bool> {
    let searcher = Searcher::new(config);
    let backend = searcher.backend().context("No usable compute backend")?;
    tracing::info!(backend = backend.name(), bits = args.bits, "starting self-test");

    let mut failed = 0u32;
    for round in 0..args.rounds {
        let test = SelfTest {
            unknown_bits: args.bits,
            seed: args.seed.map(|seed| seed.wrapping_add(u64::from(round))),
        };
        let report = test
            .run(&searcher)
            .with_context(|| format!("Self-test round {round} aborted"))?;

        tracing::info!(
            seed = report.seed,
            key = %hex::encode(report.original),
            recovered = %report.recovered.map(hex::encode).unwrap_or_default(),
            keys_per_sec = report.keys_per_second(),
            "round {round}"
        );
        println!("{report}");

        if !report.passed {
            failed += 1;
        }
    }

    if failed > 0 {
        eprintln!("WARNING: {failed} of {} rounds failed", args.rounds);
    }
    Ok(failed == 0)
}
