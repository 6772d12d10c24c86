use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use clif_model::{DataIssue, IssueKind, IssueSummary};

use crate::types::RunResult;

/// Issues listed individually; the rest are only counted.
const MAX_ISSUE_ROWS: usize = 25;

pub fn print_summary(result: &RunResult) {
    println!("Transform: {}", result.transform);
    println!("{}: {}", capitalize(result.partition_label), result.partitions);
    if result.excluded > 0 {
        println!("Excluded hospitalizations: {}", result.excluded);
    }
    if let Some(path) = &result.issues_path {
        println!("Issue report: {}", path.display());
    }

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Table"),
        header_cell("Rows"),
        header_cell("Path"),
        header_cell("SHA-256"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    for written in &result.tables {
        table.add_row(vec![
            Cell::new(written.table)
                .fg(Color::Cyan)
                .add_attribute(Attribute::Bold),
            Cell::new(written.rows),
            Cell::new(written.path.display()),
            dim_cell(&written.sha256[..written.sha256.len().min(16)]),
        ]);
    }
    println!("{table}");
    print_issue_table(&result.issues);
}

fn print_issue_table(issues: &[DataIssue]) {
    if issues.is_empty() {
        return;
    }
    let counts = IssueSummary::from_issues(issues);
    let mut ordered: Vec<&DataIssue> = issues.iter().collect();
    ordered.sort_by(|a, b| {
        kind_rank(a.kind)
            .cmp(&kind_rank(b.kind))
            .then_with(|| a.hospitalization_id.cmp(&b.hospitalization_id))
    });

    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Kind"),
        header_cell("Hospitalization"),
        header_cell("Patient"),
        header_cell("Count"),
        header_cell("Detail"),
    ]);
    apply_summary_table_style(&mut table);
    align_column(&mut table, 3, CellAlignment::Right);
    for issue in ordered.iter().take(MAX_ISSUE_ROWS) {
        table.add_row(vec![
            kind_cell(issue.kind),
            Cell::new(&issue.hospitalization_id),
            Cell::new(issue.patient_id.as_deref().unwrap_or("-")),
            Cell::new(issue.count),
            Cell::new(&issue.detail),
        ]);
    }
    println!();
    println!(
        "Issues: {} ({} timestamp, {} ordering, {} unlinkable)",
        counts.total(),
        counts.timestamp_parse,
        counts.ordering_ambiguity,
        counts.unlinkable_hospitalization
    );
    println!("{table}");
    if ordered.len() > MAX_ISSUE_ROWS {
        println!("... and {} more", ordered.len() - MAX_ISSUE_ROWS);
    }
}

fn kind_rank(kind: IssueKind) -> u8 {
    match kind {
        IssueKind::TimestampParse => 0,
        IssueKind::UnlinkableHospitalization => 1,
        IssueKind::OrderingAmbiguity => 2,
    }
}

fn kind_cell(kind: IssueKind) -> Cell {
    let color = if kind.excludes_rows() {
        Color::Red
    } else {
        Color::Yellow
    };
    Cell::new(kind.as_str()).fg(color)
}

fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(140);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value.to_string()).fg(Color::DarkGrey)
}
