//! Search Command
//!
//! Recover the unknown low bits of a key from one known block.

use anyhow::{ensure, Context, Result};
use clap::Args;
use keysweep::{BlockCipherOracle, Des, SearchConfig, SearchRequest, Searcher};

#[derive(Args)]
pub struct SearchArgs {
    /// Known key as 16 hex digits (unknown bits are cleared automatically)
    #[arg(long, value_name = "HEX")]
    prefix: String,

    /// Known plaintext block as 16 hex digits
    #[arg(long, value_name = "HEX")]
    plaintext: String,

    /// Ciphertext of the plaintext under the full key
    #[arg(long, value_name = "HEX")]
    ciphertext: String,

    /// Number of unknown low key bits
    #[arg(long)]
    bits: u32,
}

fn parse_block(name: &str, text: &str) -> Result<[u8; 8]> {
    let bytes = hex::decode(text.trim()).with_context(|| format!("Invalid hex in --{name}"))?;
    ensure!(bytes.len() == 8, "--{name} must be 8 bytes, got {}", bytes.len());
    let mut block = [0u8; 8];
    block.copy_from_slice(&bytes);
    Ok(block)
}

// =============================================================================
// SEARCH
// =============================================================================

/// Run one search. Returns whether a key was found.
pub fn run_search(args: &SearchArgs, config: SearchConfig) -> Result<bool> {
    let keyspace = keysweep::Keyspace::new(args.bits)?;
    let prefix = keyspace.clear(&parse_block("prefix", &args.prefix)?);
    let plaintext = parse_block("plaintext", &args.plaintext)?;
    let target = parse_block("ciphertext", &args.ciphertext)?;

    let searcher = Searcher::new(config);
    let found = searcher
        .search(&SearchRequest::new(prefix, plaintext, target, args.bits))
        .context("Search failed")?;

    match found {
        Some(key) => {
            println!("{}", hex::encode(Des.normalize_key(&key)));
            Ok(true)
        }
        None => {
            println!("not found");
            Ok(false)
        }
    }
}
