//! # zonal-cli — Command-Line Tool for Zone History Blobs
//!
//! Provides the `zonal` command-line interface over `zonal-codec`.
//!
//! ## Subcommands
//!
//! - `zonal inspect` — Decode a blob and summarize it, or dump it as JSON.
//! - `zonal verify` — Check that a blob is in canonical encoding.
//! - `zonal compile` — Build a model from JSON and write its binary form.
//!
//! ```bash
//! zonal compile europe-berlin.json --out europe-berlin.bin
//! zonal verify europe-berlin.bin
//! zonal inspect europe-berlin.bin --json
//! ```
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from the handlers.
//! - Handlers delegate to `zonal-codec`; no wire format logic here.
//! - Handlers return the process exit code; errors carry `anyhow` context.

pub mod compile;
pub mod inspect;
pub mod verify;

use std::path::Path;

use anyhow::{Context, Result};
use zonal_codec::{DecodeLimits, Decoder};

/// Build a decoder from `ZONAL_*` environment variables, with an optional
/// command-line override of the transition limit.
pub fn decoder(max_transitions: Option<u32>) -> Result<Decoder> {
    let mut limits = DecodeLimits::from_env().context("invalid decoder configuration")?;
    if let Some(max) = max_transitions {
        limits = limits.with_max_transitions(max);
    }
    tracing::debug!(max_transitions = limits.max_transitions, "decoder limits");
    Ok(Decoder::new(limits))
}

/// Read a whole blob from disk.
pub fn read_blob(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("failed to read blob: {}", path.display()))
}

/// Render an offset in seconds as `±HH:MM`, or `±HH:MM:SS` when not whole
/// minutes.
pub fn format_offset(offset: i32) -> String {
    let sign = if offset < 0 { '-' } else { '+' };
    let abs = offset.unsigned_abs();
    let (hours, minutes, seconds) = (abs / 3600, abs / 60 % 60, abs % 60);
    if seconds == 0 {
        format!("{sign}{hours:02}:{minutes:02}")
    } else {
        format!("{sign}{hours:02}:{minutes:02}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_offset_whole_hours() {
        assert_eq!(format_offset(3600), "+01:00");
        assert_eq!(format_offset(0), "+00:00");
        assert_eq!(format_offset(-18_000), "-05:00");
    }

    #[test]
    fn format_offset_minutes_and_seconds() {
        assert_eq!(format_offset(19_800), "+05:30");
        assert_eq!(format_offset(1172), "+00:19:32");
        assert_eq!(format_offset(i32::MIN), "-596523:14:08");
    }

    #[test]
    fn decoder_override_wins() {
        let decoder = decoder(Some(12)).unwrap();
        assert_eq!(decoder.limits().max_transitions, 12);
    }

    #[test]
    fn read_blob_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_blob(&dir.path().join("absent.bin")).unwrap_err();
        assert!(format!("{err:#}").contains("absent.bin"));
    }
}
