//! Table formatting utilities using comfy-table.

use cascade_core::{BumpLevel, PublishQueue};
use comfy_table::{Cell, Table};
use owo_colors::OwoColorize;
use tracing::debug;

/// Prints every record of a publish queue: version change, dependency
/// updates and the packages that caused the publish.
pub fn print_publish_table(queue: &PublishQueue) {
    if queue.is_empty() {
        println!("  {} {}", "→".cyan(), "(nothing to publish)".bright_black());
        return;
    }

    let mut table = Table::new();
    table
        .set_header(vec![
            Cell::new("Type").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Package").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Version").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Dependencies").add_attribute(comfy_table::Attribute::Bold),
            Cell::new("Added by").add_attribute(comfy_table::Attribute::Bold),
        ])
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(comfy_table::ContentArrangement::Dynamic);

    for record in queue {
        let (type_label, type_color) = match record.level() {
            Some(BumpLevel::Major) => ("MAJOR", comfy_table::Color::Red),
            Some(BumpLevel::Minor) => ("MINOR", comfy_table::Color::Yellow),
            Some(BumpLevel::Patch) => ("PATCH", comfy_table::Color::Green),
            None => ("SAME", comfy_table::Color::DarkGrey),
        };
        let dependencies = if record.dependencies.is_empty() {
            "-".to_string()
        } else {
            record
                .dependencies
                .iter()
                .map(|d| format!("{}: {} → {}", d.name, d.previous_version, d.new_version))
                .collect::<Vec<_>>()
                .join("\n")
        };
        let added_by = record
            .provenance
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");

        debug!(
            package = %record.name,
            from = %record.previous_version,
            to = %record.new_version,
            added_by = %added_by,
            "queued"
        );

        table.add_row(vec![
            Cell::new(type_label).fg(type_color),
            Cell::new(&record.name).fg(comfy_table::Color::White),
            Cell::new(format!("{} → {}", record.previous_version, record.new_version))
                .fg(comfy_table::Color::Cyan),
            Cell::new(dependencies),
            Cell::new(added_by).fg(comfy_table::Color::DarkGrey),
        ]);
    }

    println!("{}", table);
}
