use crate::config::DATE_FORMAT;
use crate::types::RecoveryRecord;

// ---------------------------------------------------------------------------
// Columns
// ---------------------------------------------------------------------------

/// One table column: header text and how to render a record into a cell.
pub struct Column {
    pub header: &'static str,
    pub cell: fn(&RecoveryRecord) -> String,
}

pub const UNRECOVERED_COLUMNS: [Column; 6] = [
    Column { header: "Drop Date", cell: drop_date_cell },
    Column { header: "ATH Price", cell: ath_price_cell },
    Column { header: "Drop Low", cell: drop_low_cell },
    Column { header: "Recovery/Current Price", cell: resolution_price_cell },
    Column { header: "Drop %", cell: drop_pct_cell },
    Column { header: "Recovery %", cell: recovery_pct_cell },
];

pub const RECOVERED_COLUMNS: [Column; 6] = [
    Column { header: "Drop Date", cell: drop_date_cell },
    Column { header: "ATH Price", cell: ath_price_cell },
    Column { header: "Drop Low", cell: drop_low_cell },
    Column { header: "Recovery/Current Price", cell: resolution_price_cell },
    Column { header: "Drop %", cell: drop_pct_cell },
    Column { header: "Days to Recover", cell: days_cell },
];

fn drop_date_cell(r: &RecoveryRecord) -> String {
    format_date(r.drop_date)
}

fn ath_price_cell(r: &RecoveryRecord) -> String {
    format_price(r.ath_price)
}

fn drop_low_cell(r: &RecoveryRecord) -> String {
    format_price(r.drop_low)
}

fn resolution_price_cell(r: &RecoveryRecord) -> String {
    format_price(r.resolution_price)
}

fn drop_pct_cell(r: &RecoveryRecord) -> String {
    format_pct(r.drop_pct)
}

fn recovery_pct_cell(r: &RecoveryRecord) -> String {
    format_pct(r.recovery_pct)
}

/// Only used for recovered rows, which always carry a day count.
fn days_cell(r: &RecoveryRecord) -> String {
    r.days_to_recover.map(format_days).unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Recovery-time statistics over recovered records, in calendar days.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecoveryStats {
    pub average: f64,
    pub fastest: i64,
    pub longest: i64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReportSummary {
    pub total: usize,
    pub recovered: usize,
    pub unrecovered: usize,
    /// None when nothing recovered.
    pub stats: Option<RecoveryStats>,
}

impl ReportSummary {
    pub fn from_records(records: &[RecoveryRecord]) -> Self {
        let days: Vec<i64> = records
            .iter()
            .filter(|r| r.is_recovered())
            .filter_map(|r| r.days_to_recover)
            .collect();

        let stats = match (days.iter().min(), days.iter().max()) {
            (Some(&fastest), Some(&longest)) => Some(RecoveryStats {
                average: days.iter().sum::<i64>() as f64 / days.len() as f64,
                fastest,
                longest,
            }),
            _ => None,
        };

        let recovered = records.iter().filter(|r| r.is_recovered()).count();
        Self {
            total: records.len(),
            recovered,
            unrecovered: records.len() - recovered,
            stats,
        }
    }
}

/// Splits records into `(unrecovered, recovered)`, each in input order.
pub fn split(records: &[RecoveryRecord]) -> (Vec<&RecoveryRecord>, Vec<&RecoveryRecord>) {
    let (recovered, unrecovered) = records.iter().partition(|r| r.is_recovered());
    (unrecovered, recovered)
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Renders records as a right-aligned text table without an index column.
pub fn render_table(records: &[&RecoveryRecord], columns: &[Column]) -> String {
    let cells: Vec<Vec<String>> = records
        .iter()
        .map(|r| columns.iter().map(|c| (c.cell)(r)).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(i, c)| {
            cells
                .iter()
                .map(|row| row[i].chars().count())
                .fold(c.header.chars().count(), usize::max)
        })
        .collect();

    let mut lines = Vec::with_capacity(cells.len() + 1);
    lines.push(join_row(columns.iter().map(|c| c.header), &widths));
    for row in &cells {
        lines.push(join_row(row.iter().map(String::as_str), &widths));
    }
    lines.join("\n")
}

fn join_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, &w)| format!("{cell:>w$}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Full text report: unrecovered table, recovered table, then summary lines.
pub fn render_report(records: &[RecoveryRecord], threshold: i32) -> String {
    let mut out = String::from("\nDetailed Recovery Analysis:\n");

    if records.is_empty() {
        out.push_str(&format!(
            "No drops of {threshold}% or more found in the given time period.\n"
        ));
        return out;
    }

    let (unrecovered, recovered) = split(records);
    if !unrecovered.is_empty() {
        out.push_str("\nUNRECOVERED DROPS:\n");
        out.push_str(&render_table(&unrecovered, &UNRECOVERED_COLUMNS));
        out.push('\n');
    }
    if !recovered.is_empty() {
        out.push_str("\nRECOVERED DROPS:\n");
        out.push_str(&render_table(&recovered, &RECOVERED_COLUMNS));
        out.push('\n');
    }

    let summary = ReportSummary::from_records(records);
    out.push_str("\nSummary Statistics:\n");
    out.push_str(&format!("Total number of {threshold}% drops: {}\n", summary.total));
    out.push_str(&format!("Number of recovered drops: {}\n", summary.recovered));
    out.push_str(&format!("Number of unrecovered drops: {}\n", summary.unrecovered));

    if let Some(stats) = summary.stats {
        out.push_str("\nRecovery Statistics (for recovered drops):\n");
        out.push_str(&format!("Average recovery time: {:.0} days\n", stats.average));
        out.push_str(&format!("Fastest recovery: {} days\n", stats.fastest));
        out.push_str(&format!("Longest recovery: {} days\n", stats.longest));
    }
    out
}

// ---------------------------------------------------------------------------
// Formatting helpers
// ---------------------------------------------------------------------------

pub fn format_date(d: chrono::NaiveDate) -> String {
    d.format(DATE_FORMAT).to_string()
}

pub fn format_price(v: f64) -> String {
    format!("{v:.2}")
}

/// Percentage with two decimals, no sign or `%` suffix.
pub fn format_pct(v: f64) -> String {
    format!("{v:.2}")
}

pub fn format_days(days: i64) -> String {
    days.to_string()
}
