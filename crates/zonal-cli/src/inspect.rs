//! # Inspect Subcommand
//!
//! Decodes one blob and prints what it holds: a short summary by default,
//! or the full object as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use zonal_codec::{WireType, ZoneObject};
use zonal_core::RuleKind;

/// Arguments for the `zonal inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Path to the binary blob.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Print the decoded object as JSON.
    #[arg(long)]
    pub json: bool,

    /// Reject transition lists longer than this (overrides ZONAL_MAX_TRANSITIONS).
    #[arg(long)]
    pub max_transitions: Option<u32>,
}

/// JSON report printed with `--json`.
#[derive(Debug, Serialize)]
struct Report<'a> {
    kind: String,
    tag: u8,
    bytes: usize,
    object: &'a ZoneObject,
}

/// Execute the inspect subcommand.
pub fn run_inspect(args: &InspectArgs) -> Result<u8> {
    let decoder = crate::decoder(args.max_transitions)?;
    let blob = crate::read_blob(&args.file)?;
    let object = decoder
        .decode_object(&blob)
        .with_context(|| format!("failed to decode {}", args.file.display()))?;

    if args.json {
        let report = Report {
            kind: describe(object.wire_type()),
            tag: object.type_tag(),
            bytes: blob.len(),
            object: &object,
        };
        let json = serde_json::to_string_pretty(&report).context("failed to render JSON")?;
        println!("{json}");
    } else {
        print!("{}", summarize(&object, blob.len()));
    }
    Ok(0)
}

/// Human-readable name of an object shape.
pub fn describe(wire: WireType) -> String {
    match wire {
        WireType::Rule(RuleKind::FixedDay) => "fixed-day rule".to_string(),
        WireType::Rule(RuleKind::DayOfWeekInMonth) => "day-of-week-in-month rule".to_string(),
        WireType::Rule(RuleKind::LastDayOfWeek) => "last-day-of-week rule".to_string(),
        WireType::Model(kind) => format!("{kind} model"),
    }
}

fn summarize(object: &ZoneObject, size: usize) -> String {
    let mut lines = vec![
        format!("kind:        {} (tag {})", describe(object.wire_type()), object.type_tag()),
        format!("size:        {size} bytes"),
    ];

    match object {
        ZoneObject::Model(model) => {
            lines.push(format!("initial:     {}", crate::format_offset(model.initial_offset())));
            lines.push(format!("transitions: {}", model.transitions().len()));
            if let Some(last) = model.transitions().last() {
                lines.push(format!(
                    "last:        {} -> {} (dst {})",
                    last.posix_time(),
                    crate::format_offset(last.total_offset()),
                    crate::format_offset(last.daylight_saving_offset()),
                ));
            }
            lines.push(format!("rules:       {}", model.rules().len()));
        }
        ZoneObject::Rule(rule) => {
            lines.push(format!("month:       {}", rule.month().name()));
            lines.push(format!("time:        {} s ({:?})", rule.time_of_day(), rule.indicator()));
            lines.push(format!("savings:     {}", crate::format_offset(rule.savings())));
        }
    }

    let mut out = lines.join("\n");
    out.push('\n');
    out
}
