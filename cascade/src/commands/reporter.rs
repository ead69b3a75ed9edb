//! Publish reporter implementation for CLI.

use cascade_core::{PublishRecord, PublishReporter};
use owo_colors::OwoColorize;

/// CLI implementation of PublishReporter.
pub struct CliPublishReporter;

impl PublishReporter for CliPublishReporter {
    fn report_start(&self, record: &PublishRecord, position: usize, total: usize) {
        println!(
            "{} Publishing {} {}",
            format!("[{}/{}]", position, total).bright_black(),
            record.name.bold().white(),
            record.new_version.to_string().cyan()
        );
    }

    fn report_published(&self, record: &PublishRecord) {
        println!(
            "  {} {}@{}",
            "✓".green(),
            record.name,
            record.new_version
        );
    }
}
