//! Shared display helpers for CLI commands

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::cli::dispatcher::CommandSpec;
use crate::history::TIMESTAMP_MARKER;
use crate::profile::{OptionSpec, Profile};
use crate::session::SessionConfig;

fn table_with_header(header: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header.iter().map(|h| Cell::new(h).fg(Color::Cyan)));
    table
}

/// Options of `profile` with their current or default values.
///
/// Required options still lacking a value are marked `*`.
pub fn options_table(profile: &Profile, config: &SessionConfig) -> Table {
    let mut table = table_with_header(&["", "Option", "Value"]);

    for name in &profile.required {
        let value = config
            .get(name)
            .or_else(|| profile.default_for(name))
            .unwrap_or("");
        let marker = if value.is_empty() { "*" } else { "" };
        table.add_row(vec![
            Cell::new(marker).fg(Color::Red),
            Cell::new(name).fg(Color::Cyan),
            Cell::new(value),
        ]);
    }
    for name in &profile.optional {
        let value = config
            .get(name)
            .or_else(|| profile.default_for(name))
            .unwrap_or("");
        table.add_row(vec![Cell::new(""), Cell::new(name), Cell::new(value)]);
    }
    table
}

/// Summary printed after a build: payload type, build time, and every
/// profile option that ended up with a value.
pub fn build_summary(profile: &Profile, spec: &SessionConfig, built_at: &str) -> Table {
    let mut table = table_with_header(&["Build Summary", ""]);
    table.add_row(vec!["Payload Type", profile.name.as_str()]);
    table.add_row(vec!["Build Time", built_at]);
    for name in profile.options() {
        if let Some(value) = spec.get(name).filter(|v| !v.is_empty()) {
            table.add_row(vec![name, value]);
        }
    }
    table
}

/// Command overview for `help`
pub fn commands_table(commands: &[CommandSpec]) -> Table {
    let mut table = table_with_header(&["Command", "Description"]);
    for command in commands {
        table.add_row(vec![Cell::new(command.name).fg(Color::Cyan), Cell::new(command.summary)]);
    }
    table
}

/// Allowed values of an enumerated option, `None` for free text
pub fn values_table(spec: &OptionSpec) -> Option<Table> {
    let allowed = spec.allowed_values.as_ref()?;
    let mut table = table_with_header(&["Value", "Description"]);
    for (value, description) in allowed {
        table.add_row(vec![value.as_str(), description.as_str()]);
    }
    Some(table)
}

/// Colorize one raw history line: timestamp in cyan, status in green or red,
/// and `highlight` (if any) in yellow within the field list.
pub fn format_history_line(line: &str, highlight: Option<&str>) -> String {
    let Some((fields, rest)) = line.split_once(TIMESTAMP_MARKER) else {
        return line.to_string();
    };

    let fields = match highlight {
        Some(needle) if !needle.is_empty() => {
            fields.replace(needle, &needle.yellow().bold().to_string())
        }
        _ => fields.to_string(),
    };

    let (timestamp, status) = rest.rsplit_once(' ').unwrap_or((rest, ""));
    let status = match status {
        "SUCCESS" => "[✓] SUCCESS".green().to_string(),
        "FAIL" => "[!] FAIL".red().to_string(),
        other => other.to_string(),
    };

    format!("{}{}{} {}", fields, TIMESTAMP_MARKER, timestamp.cyan(), status)
}
