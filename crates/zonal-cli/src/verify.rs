//! # Verify Subcommand
//!
//! Decodes a blob, encodes the result again and checks that the bytes are
//! identical. A blob that passes is in canonical form: every shortcut that
//! could apply was taken and nothing trails the object.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

/// Arguments for the `zonal verify` subcommand.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Path to the binary blob.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Reject transition lists longer than this (overrides ZONAL_MAX_TRANSITIONS).
    #[arg(long)]
    pub max_transitions: Option<u32>,
}

/// Execute the verify subcommand. Returns 1 when the blob is malformed or
/// not canonical.
pub fn run_verify(args: &VerifyArgs) -> Result<u8> {
    let decoder = crate::decoder(args.max_transitions)?;
    let blob = crate::read_blob(&args.file)?;

    let object = match decoder.decode_object(&blob) {
        Ok(object) => object,
        Err(e) if e.is_malformed_input() => {
            println!("FAIL: malformed blob: {e}");
            return Ok(1);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("failed to decode {}", args.file.display()))
        }
    };

    let mut encoded = Vec::with_capacity(blob.len());
    zonal_codec::write_object(&mut encoded, &object).context("failed to re-encode object")?;

    match first_difference(&blob, &encoded) {
        None => {
            println!("OK: canonical encoding ({} bytes)", blob.len());
            Ok(0)
        }
        Some(offset) => {
            println!(
                "FAIL: re-encoded bytes differ at offset {offset} ({} bytes read, {} bytes canonical)",
                blob.len(),
                encoded.len()
            );
            Ok(1)
        }
    }
}

/// Index of the first differing byte, counting a length mismatch as a
/// difference at the end of the shorter input.
fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then_some(a.len().min(b.len())))
}
