//! # Export Encoder
//!
//! Deterministic serialization of filtered projections.
//!
//! ## Formats
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Delimited text (CSV, UTF-8, "\n" records)                              │
//! │    ID,Item Name,Category,Quantity,Unit,Min Level,Status                 │
//! │    HK-001,"Tissue, ""Premium""",Housekeeping,7,pcs,5,In Stock           │
//! │                                                                         │
//! │  Tabular report (print)                                                 │
//! │    Stockroom - Inventory Report                                         │
//! │    Generated on: 2024-03-01 | Filter: Issue                             │
//! │                                                                         │
//! │    Date        Type   Item         Quantity  Location      Person       │
//! │    ----------  -----  -----------  --------  ------------  ------       │
//! │    2024-03-01  Issue  Tissue Roll  3 pcs     Ground Floor  Asha         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Column order is fixed by a column spec. Text fields are quoted only when
//! they contain the delimiter, a quote or a line break; embedded quotes are
//! doubled. Numbers are never quoted.

use chrono::NaiveDate;
use csv::{QuoteStyle, Terminator, WriterBuilder};
use std::fmt;

use crate::error::{CoreError, CoreResult};
use crate::quantity::Quantity;
use crate::types::{Item, Transaction};

// =============================================================================
// Column Specs
// =============================================================================

/// One cell value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
    Text(String),
    Number(Quantity),
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Text(text) => f.write_str(text),
            Field::Number(q) => write!(f, "{}", q),
        }
    }
}

/// A named projection from a row to a cell.
pub struct Column<T> {
    pub header: &'static str,
    pub value: fn(&T) -> Field,
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Column<T> {}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Column").field("header", &self.header).finish()
    }
}

/// Ordered list of columns.
pub type ColumnSpec<T> = [Column<T>];

fn text(value: &str) -> Field {
    Field::Text(value.to_string())
}

fn export_date(tx: &Transaction) -> Field {
    Field::Text(tx.date.format("%Y-%m-%d").to_string())
}

fn location_label(tx: &Transaction) -> Field {
    text(tx.location.map(|l| l.as_str()).unwrap_or_default())
}

/// Full inventory export.
pub const INVENTORY_COLUMNS: &ColumnSpec<Item> = &[
    Column { header: "ID", value: |i| text(&i.id) },
    Column { header: "Item Name", value: |i| text(&i.name) },
    Column { header: "Category", value: |i| text(i.category.as_str()) },
    Column { header: "Quantity", value: |i| Field::Number(i.quantity) },
    Column { header: "Unit", value: |i| text(&i.unit) },
    Column { header: "Min Level", value: |i| Field::Number(i.min_level) },
    Column { header: "Status", value: |i| text(i.status_label()) },
];

/// Full transaction history export.
pub const TRANSACTION_COLUMNS: &ColumnSpec<Transaction> = &[
    Column { header: "Date", value: export_date },
    Column { header: "Type", value: |t| text(t.kind.as_str()) },
    Column { header: "Item Name", value: |t| text(&t.item_name) },
    Column { header: "Quantity", value: |t| Field::Number(t.quantity) },
    Column { header: "Unit", value: |t| text(&t.unit) },
    Column { header: "Location", value: location_label },
    Column { header: "Person", value: |t| text(&t.person_name) },
    Column { header: "Notes", value: |t| text(t.notes.as_deref().unwrap_or_default()) },
];

/// Compact print columns: `[Date, Type, Item, Quantity+Unit, Location, Person]`.
pub const REPORT_COLUMNS: &ColumnSpec<Transaction> = &[
    Column { header: "Date", value: export_date },
    Column { header: "Type", value: |t| text(t.kind.as_str()) },
    Column { header: "Item", value: |t| text(&t.item_name) },
    Column { header: "Quantity", value: |t| Field::Text(format!("{} {}", t.quantity, t.unit)) },
    Column { header: "Location", value: location_label },
    Column { header: "Person", value: |t| text(&t.person_name) },
];

// =============================================================================
// Delimited Text
// =============================================================================

fn encoding_error(err: impl fmt::Display) -> CoreError {
    CoreError::Encoding(err.to_string())
}

/// Encodes rows as comma-separated text with a header line.
///
/// ## Example
/// ```rust
/// use stockroom_core::export::{to_delimited_text, Column, Field};
///
/// let columns = [Column::<(&str, i64)> { header: "Name", value: |r| Field::Text(r.0.to_string()) }];
/// let csv = to_delimited_text(&[("Tissue, \"Premium\"", 1)], &columns).unwrap();
/// assert_eq!(csv, "Name\n\"Tissue, \"\"Premium\"\"\"\n");
/// ```
pub fn to_delimited_text<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    columns: &ColumnSpec<T>,
) -> CoreResult<String> {
    let mut writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(columns.iter().map(|c| c.header))
        .map_err(encoding_error)?;

    for row in rows {
        writer
            .write_record(columns.iter().map(|c| (c.value)(row).to_string()))
            .map_err(encoding_error)?;
    }

    let bytes = writer.into_inner().map_err(encoding_error)?;
    String::from_utf8(bytes).map_err(encoding_error)
}

// =============================================================================
// Tabular Report
// =============================================================================

/// Headers plus stringified cells, ready for layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub headers: Vec<&'static str>,
    pub rows: Vec<Vec<String>>,
}

/// Projects rows through a (reduced) column spec.
pub fn to_tabular_report<'a, T: 'a>(
    rows: impl IntoIterator<Item = &'a T>,
    columns: &ColumnSpec<T>,
) -> Table {
    Table {
        headers: columns.iter().map(|c| c.header).collect(),
        rows: rows
            .into_iter()
            .map(|row| columns.iter().map(|c| (c.value)(row).to_string()).collect())
            .collect(),
    }
}

/// A printable report: heading lines and a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabularReport {
    pub title: String,
    pub generated_on: NaiveDate,
    pub filter_label: String,
    pub table: Table,
}

impl Table {
    /// Header, dash rule and rows as aligned plain text.
    pub fn render_text(&self) -> String {
        let widths: Vec<usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(col, header)| {
                self.rows
                    .iter()
                    .filter_map(|r| r.get(col))
                    .map(|cell| cell.chars().count())
                    .chain([header.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let mut out = layout_line(self.headers.iter().copied(), &widths);
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&layout_line(rule.iter().map(String::as_str), &widths));
        out.push('\n');
        for row in &self.rows {
            out.push_str(&layout_line(row.iter().map(String::as_str), &widths));
            out.push('\n');
        }
        out
    }
}

impl TabularReport {
    /// Renders the report as aligned plain text, one line per row.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&self.title);
        out.push('\n');
        out.push_str(&format!(
            "Generated on: {} | Filter: {}\n\n",
            self.generated_on.format("%Y-%m-%d"),
            self.filter_label
        ));
        out.push_str(&self.table.render_text());
        if self.table.rows.is_empty() {
            out.push_str("(no transactions)\n");
        }
        out
    }
}

fn layout_line<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    let line = cells
        .zip(widths)
        .map(|(cell, &width)| format!("{:<width$}", cell, width = width))
        .collect::<Vec<_>>()
        .join("  ");
    line.trim_end().to_string()
}

// =============================================================================
// File Names
// =============================================================================

/// Which export a file holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportKind {
    InventoryCsv,
    ReportCsv,
    ReportText,
}

/// `<prefix>_inventory_<date>.csv`, `<prefix>_report_<date>.csv|.txt`.
pub fn export_file_name(prefix: &str, kind: ExportKind, date: NaiveDate) -> String {
    let (stem, ext) = match kind {
        ExportKind::InventoryCsv => ("inventory", "csv"),
        ExportKind::ReportCsv => ("report", "csv"),
        ExportKind::ReportText => ("report", "txt"),
    };
    format!("{}_{}_{}.{}", prefix, stem, date.format("%Y-%m-%d"), ext)
}

// =============================================================================
// Unit Tests
// =============================================================================
