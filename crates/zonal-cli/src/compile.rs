//! # Compile Subcommand
//!
//! Builds a transition model from its JSON description and writes the binary
//! envelope. The JSON goes through the validating model constructors, so a
//! model with unordered transitions or rules is rejected before anything is
//! written.
//!
//! ```json
//! {
//!   "model": "array",
//!   "transitions": [
//!     { "posix_time": 1711846800, "previous_offset": 3600,
//!       "total_offset": 7200, "daylight_saving_offset": 3600 }
//!   ]
//! }
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use zonal_core::TransitionModel;

/// Arguments for the `zonal compile` subcommand.
#[derive(Args, Debug)]
pub struct CompileArgs {
    /// Path to the JSON model description.
    #[arg(value_name = "JSON")]
    pub input: PathBuf,

    /// Output path for the binary blob.
    #[arg(long, short)]
    pub out: PathBuf,
}

/// Execute the compile subcommand.
pub fn run_compile(args: &CompileArgs) -> Result<u8> {
    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read model file: {}", args.input.display()))?;
    let model: TransitionModel = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse model JSON: {}", args.input.display()))?;

    let bytes = zonal_codec::encode_model(&model).context("failed to encode model")?;
    tracing::info!(
        kind = %model.kind(),
        transitions = model.transitions().len(),
        rules = model.rules().len(),
        bytes = bytes.len(),
        "compiled model"
    );

    std::fs::write(&args.out, &bytes)
        .with_context(|| format!("failed to write blob: {}", args.out.display()))?;
    println!("OK: wrote {} bytes to {}", bytes.len(), args.out.display());
    Ok(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPOSITE_JSON: &str = r#"{
        "model": "composite",
        "transitions": [
            { "posix_time": 1000000000, "previous_offset": 0,
              "total_offset": 3600, "daylight_saving_offset": 3600 }
        ],
        "rules": [
            { "pattern": "fixed_day", "month": "March", "day_of_month": 1,
              "time_of_day": 0, "indicator": "wall_time", "savings": 3600 }
        ]
    }"#;

    fn compile(json: &str) -> (tempfile::TempDir, Result<u8>) {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("zone.json");
        std::fs::write(&input, json).unwrap();
        let args = CompileArgs {
            input,
            out: dir.path().join("zone.bin"),
        };
        let result = run_compile(&args);
        (dir, result)
    }

    #[test]
    fn compiles_composite_model() {
        let (dir, result) = compile(COMPOSITE_JSON);
        assert_eq!(result.unwrap(), 0);
        let bytes = std::fs::read(dir.path().join("zone.bin")).unwrap();
        assert_eq!(bytes[0], 127);
        let model = zonal_codec::decode_model(&bytes).unwrap();
        assert_eq!(model.transitions().len(), 1);
        assert_eq!(model.rules().len(), 1);
    }

    #[test]
    fn rejects_unordered_transitions() {
        let json = r#"{
            "model": "array",
            "transitions": [
                { "posix_time": 100, "previous_offset": 0,
                  "total_offset": 0, "daylight_saving_offset": 0 },
                { "posix_time": 50, "previous_offset": 0,
                  "total_offset": 0, "daylight_saving_offset": 0 }
            ]
        }"#;
        let (dir, result) = compile(json);
        let err = result.unwrap_err();
        assert!(format!("{err:#}").contains("does not follow"));
        assert!(!dir.path().join("zone.bin").exists());
    }

    #[test]
    fn rejects_malformed_json() {
        let (_dir, result) = compile("{ not json");
        assert!(format!("{:#}", result.unwrap_err()).contains("failed to parse model JSON"));
    }
}
