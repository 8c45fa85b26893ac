//! CLI output formatting.
//!
//! Display is information-centric: the primary line for every asset is its
//! category and name, with dimensions and status as context. Each view has
//! a `format_*` function (returns `Vec<String>`, pure, testable) and a
//! `print_*` wrapper that writes to stdout.

use crate::entry::AssetKind;
use crate::generate::{GenerateEvent, GenerateReport};
use crate::instructions::InstructionSet;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Format a resolved instruction set as a category tree.
///
/// ```text
/// logo.png (24 assets)
///     favicon (1)
///         favicon-48x48.png 48x48
///     apple splash screen (30)
///         apple-splash-portrait-640x1136.png 640x1136
///         ...
/// ```
pub fn format_resolve_summary(set: &InstructionSet) -> Vec<String> {
    let mut lines = vec![format!(
        "{} ({} assets)",
        set.source.display(),
        set.len()
    )];
    for kind in AssetKind::ALL {
        let entries = set.entries(kind);
        if entries.is_empty() {
            continue;
        }
        lines.push(format!("{}{} ({})", indent(1), kind, entries.len()));
        for entry in entries {
            lines.push(format!(
                "{}{} {}x{}",
                indent(2),
                entry.name,
                entry.width,
                entry.height
            ));
        }
    }
    lines
}

pub fn print_resolve_summary(set: &InstructionSet) {
    for line in format_resolve_summary(set) {
        println!("{line}");
    }
}

/// Format one generation progress event.
pub fn format_generate_event(event: &GenerateEvent) -> String {
    match event {
        GenerateEvent::Written { kind, name } => format!("{}{name}: written ({kind})", indent(1)),
        GenerateEvent::Skipped { kind, name } => format!("{}{name}: exists ({kind})", indent(1)),
        GenerateEvent::Failed {
            kind,
            name,
            message,
        } => format!("{}{name}: FAILED ({kind}): {message}", indent(1)),
    }
}

/// Format the final generation report summary line(s).
pub fn format_report(report: &GenerateReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Generated {} assets ({} written, {} skipped, {} failed)",
        report.total(),
        report.written.len(),
        report.skipped.len(),
        report.failed.len()
    )];
    for failed in &report.failed {
        lines.push(format!(
            "{}{}: {} ({})",
            indent(1),
            failed.url,
            failed.message,
            failed.kind
        ));
    }
    lines
}

pub fn print_report(report: &GenerateReport) {
    for line in format_report(report) {
        println!("{line}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::ResolveOptions;
    use crate::generate::{AssetRecord, FailedAsset};
    use crate::instructions::resolve_image;
    use crate::options::Defaults;
    use crate::test_helpers::{small_preset, test_image};
    use std::path::PathBuf;

    #[test]
    fn resolve_summary_leads_with_source_and_total() {
        let set = resolve_image(
            PathBuf::from("logo.png"),
            test_image(16, 16),
            &small_preset(),
            &ResolveOptions::default(),
            &Defaults::default(),
        )
        .unwrap();
        let lines = format_resolve_summary(&set);
        assert_eq!(lines[0], format!("logo.png ({} assets)", set.len()));
        assert!(lines.iter().any(|l| l.contains("favicon (1)")));
        assert!(lines.iter().any(|l| l.contains("favicon-48x48.png 48x48")));
    }

    #[test]
    fn report_counts_all_outcomes() {
        let report = GenerateReport {
            written: vec![AssetRecord {
                kind: AssetKind::Favicon,
                name: "favicon-48x48.png".to_string(),
                path: PathBuf::from("out/favicon-48x48.png"),
            }],
            skipped: vec![],
            failed: vec![FailedAsset {
                kind: AssetKind::Maskable,
                url: "/maskable-icon-512x512.png".to_string(),
                message: "boom".to_string(),
            }],
        };
        let lines = format_report(&report);
        assert_eq!(
            lines[0],
            "Generated 2 assets (1 written, 0 skipped, 1 failed)"
        );
        assert!(lines[1].contains("/maskable-icon-512x512.png"));
        assert!(lines[1].contains("boom"));
    }

    #[test]
    fn event_lines_name_the_asset() {
        let written = GenerateEvent::Written {
            kind: AssetKind::Favicon,
            name: "favicon-48x48.png".to_string(),
        };
        assert_eq!(
            format_generate_event(&written),
            "    favicon-48x48.png: written (favicon)"
        );
    }
}
