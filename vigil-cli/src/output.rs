//! Console output
//!
//! Everything the user reads goes to stdout through here; diagnostics go
//! through `tracing` to stderr.

use colored::*;
use std::time::Duration;
use vigil_core::domain::entity::{Entity, EntityKind};
use vigil_watch::{PollReport, ProgressSink};

/// Print a titled list of names, one per line
pub fn print_names(title: &str, names: &[String]) {
    println!("{} ({})", title.bold(), names.len());
    if names.is_empty() {
        println!("  {}", "(none)".dimmed());
    }
    for name in names {
        println!("  - {}", name);
    }
}

/// Print one entity with its event labels
pub fn print_entity(entity: &Entity) {
    let latest = entity.latest_label().unwrap_or("-");
    println!("{}  {}", entity.name.bold(), colorize_label(latest));

    for label in entity.labels() {
        println!("    {} {}", "•".dimmed(), label);
    }
}

/// Colorize a label by what it usually means
pub fn colorize_label(label: &str) -> ColoredString {
    let upper = label.to_ascii_uppercase();
    if upper.contains("FAIL") || upper.contains("ERROR") {
        label.red()
    } else if upper.contains("COMPLETED") || upper.contains("FINISHED") {
        label.green()
    } else if upper.contains("RUNNING") || upper.contains("RECEIVED") {
        label.blue()
    } else {
        label.normal()
    }
}

/// Format a duration as whole minutes and seconds
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    match (secs / 60, secs % 60) {
        (0, s) => format!("{}s", s),
        (m, 0) => format!("{}m", m),
        (m, s) => format!("{}m {}s", m, s),
    }
}

/// Prints each poll of a convergence loop
pub struct ConsoleProgress {
    kind: EntityKind,
    label: String,
}

impl ConsoleProgress {
    pub fn new(kind: EntityKind, label: impl Into<String>) -> Self {
        Self {
            kind,
            label: label.into(),
        }
    }
}

impl ProgressSink for ConsoleProgress {
    fn on_poll(&mut self, report: &PollReport<'_>) {
        println!();
        print_names(
            &format!(
                "Poll {}: {} with '{}'",
                report.iteration,
                self.kind.plural(),
                self.label
            ),
            report.observed,
        );

        if !report.missing.is_empty() {
            println!(
                "  {} {}",
                "still missing:".yellow(),
                report.missing.join(", ")
            );
        }
    }

    fn on_wait(&mut self, delay: Duration, retries_left: u32) {
        println!(
            "{}",
            format!(
                "Waiting {} for {} to finish ({} retries left)...",
                format_duration(delay),
                self.kind.plural(),
                retries_left
            )
            .dimmed()
        );
    }
}
