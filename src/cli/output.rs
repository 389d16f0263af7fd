/// Terminal output helpers shared by the commands
use colored::*;
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color as TableColor, ContentArrangement, Table};

use crate::core::report::ResolutionReport;

pub fn section_header_with_line(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

pub fn subsection_header(title: &str) {
    println!("\n{} {}", "◆".cyan(), title.bold());
}

pub fn success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

pub fn info(message: &str) {
    println!("{} {}", "●".blue(), message);
}

pub fn warning(message: &str) {
    println!("{} {}", "⚠".yellow(), message);
}

pub fn tree_item(is_last: bool, label: &str, value: Option<&str>) {
    let prefix = if is_last { "└─" } else { "├─" };
    if let Some(val) = value {
        println!("{} {}: {}", prefix.dimmed(), label, val);
    } else {
        println!("{} {}", prefix.dimmed(), label);
    }
}

/// Tree section with nested items
pub fn tree_section(title: &str, items: Vec<(&str, String)>, is_last: bool) {
    tree_item(is_last, title, None);
    let continuation = if is_last { "   " } else { "│  " };

    for (i, (label, value)) in items.iter().enumerate() {
        let prefix = if i == items.len() - 1 { "└─" } else { "├─" };
        println!(
            "{}{} {}: {}",
            continuation.dimmed(),
            prefix.dimmed(),
            label,
            value
        );
    }
}

pub fn create_standard_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .add_attribute(Attribute::Bold)
        .fg(TableColor::Cyan)
}

/// Format a number with thousands separator
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Per-type counts as a table, skipping types with no matches
pub fn match_type_table(report: &ResolutionReport) -> Table {
    let mut table = create_standard_table();
    table.set_header(vec![
        header_cell("Match type"),
        header_cell("Count"),
        header_cell("Share"),
    ]);

    let total = report.total_matches();
    for (match_type, count) in report.match_types.iter().filter(|(_, c)| **c > 0) {
        let share = if total == 0 {
            0.0
        } else {
            *count as f64 / total as f64 * 100.0
        };
        table.add_row(vec![
            Cell::new(match_type.as_str()),
            Cell::new(format_number(*count)).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}%", share)).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

pub fn print_report(report: &ResolutionReport) {
    section_header_with_line("Crosswalk Summary");

    tree_section(
        "Input",
        vec![
            ("Source taxa", format_number(report.source_taxa)),
            ("Considered", format_number(report.considered_taxa)),
            ("Candidates", format_number(report.candidate_taxa)),
        ],
        false,
    );

    let mut results = vec![
        ("Exact matches", format_number(report.exact_matches)),
        ("Fuzzy matches", format_number(report.fuzzy_matches)),
        ("Unmatched", format_number(report.unmatched)),
        ("Match rate", format!("{:.1}%", report.match_rate())),
    ];
    if report.fuzzy_enabled {
        results.push(("Fuzzy batches", format_number(report.batches)));
        results.push(("Workers", format_number(report.workers)));
    }
    results.push(("Elapsed", format!("{:.2}s", report.elapsed_secs)));
    tree_section("Results", results, true);

    if report.total_matches() > 0 {
        subsection_header("Matches by type");
        println!("{}", match_type_table(report));
    }
}
