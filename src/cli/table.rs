//! Table formatting utilities for CLI list commands
//!
//! List commands build [`TableRow`]s of typed [`CellValue`]s and hand them to
//! a [`TableFormatter`], which renders aligned colored text, CSV, markdown
//! or bare ids. JSON and YAML output serialize the records themselves.

use chrono::NaiveDate;
use console::style;
use miette::{IntoDiagnostic, Result};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;
use crate::core::schedule::{DeliveryStatus, RiskTier};
use crate::entities::project::{format_budget, ProjectStatus};
use crate::entities::submittal::SubmittalStatus;

/// A typed cell value with semantic meaning for formatting
#[derive(Debug, Clone)]
pub enum CellValue {
    /// Item id in short form, cyan
    Id(String),
    /// Plain text, truncated to the column width
    Text(String),
    Date(Option<NaiveDate>),
    /// Whole number that may be missing (lead time)
    Number(Option<u32>),
    Count(usize),
    Budget(Option<u64>),
    Percent(u8),
    Delivery(Option<DeliveryStatus>),
    Risk(RiskTier),
    ProjectStatus(ProjectStatus),
    Submittal(Option<SubmittalStatus>),
}

impl CellValue {
    /// Get raw string value (no styling; empty when absent)
    pub fn raw(&self) -> String {
        match self {
            CellValue::Id(s) | CellValue::Text(s) => s.clone(),
            CellValue::Date(d) => d.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default(),
            CellValue::Number(n) => n.map(|n| n.to_string()).unwrap_or_default(),
            CellValue::Count(n) => n.to_string(),
            CellValue::Budget(b) => format_budget(*b),
            CellValue::Percent(p) => format!("{}%", p),
            CellValue::Delivery(s) => s.map(|s| s.to_string()).unwrap_or_default(),
            CellValue::Risk(r) => r.to_string(),
            CellValue::ProjectStatus(s) => s.to_string(),
            CellValue::Submittal(s) => s.map(|s| s.to_string()).unwrap_or_default(),
        }
    }

    /// Text shown in human-facing tables; `-` stands in for missing values
    fn display(&self) -> String {
        let raw = self.raw();
        if raw.is_empty() {
            "-".to_string()
        } else {
            raw
        }
    }

    /// Format for aligned terminal output with colors
    pub fn format_tsv(&self, width: usize) -> String {
        let text = truncate_str(&self.display(), width);
        match self {
            CellValue::Id(_) => format!("{:<width$}", style(text).cyan(), width = width),
            CellValue::Delivery(Some(DeliveryStatus::Delayed)) => {
                format!("{:<width$}", style(text).red().bold(), width = width)
            }
            CellValue::Delivery(Some(DeliveryStatus::OnTime)) => {
                format!("{:<width$}", style(text).yellow(), width = width)
            }
            CellValue::Delivery(Some(DeliveryStatus::Early)) => {
                format!("{:<width$}", style(text).green(), width = width)
            }
            CellValue::Risk(RiskTier::High) => {
                format!("{:<width$}", style(text).red(), width = width)
            }
            CellValue::Risk(RiskTier::Medium) => {
                format!("{:<width$}", style(text).yellow(), width = width)
            }
            CellValue::Risk(RiskTier::Low) => {
                format!("{:<width$}", style(text).green(), width = width)
            }
            CellValue::ProjectStatus(ProjectStatus::Delayed) => {
                format!("{:<width$}", style(text).red(), width = width)
            }
            CellValue::ProjectStatus(ProjectStatus::Completed) => {
                format!("{:<width$}", style(text).green(), width = width)
            }
            CellValue::Submittal(Some(SubmittalStatus::ReviseResubmit)) => {
                format!("{:<width$}", style(text).red(), width = width)
            }
            CellValue::Submittal(Some(SubmittalStatus::Pending)) => {
                format!("{:<width$}", style(text).yellow(), width = width)
            }
            CellValue::Date(None) | CellValue::Number(None) | CellValue::Budget(None) => {
                format!("{:<width$}", style(text).dim(), width = width)
            }
            _ => format!("{:<width$}", text, width = width),
        }
    }

    /// Format for markdown output (escapes pipes)
    pub fn format_md(&self) -> String {
        self.display().replace('|', "\\|")
    }

    /// Get the display width of this cell's content (for dynamic column sizing)
    pub fn display_width(&self) -> usize {
        self.display().chars().count()
    }
}

/// Column definition with header label and maximum width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output
pub struct TableRow {
    /// Row reference accepted by show/edit/delete (e.g. `PRC@3`)
    pub reference: String,
    pub full_id: String,
    pub cells: Vec<(&'static str, CellValue)>,
}

impl TableRow {
    pub fn new(reference: impl Into<String>, full_id: impl Into<String>) -> Self {
        Self {
            reference: reference.into(),
            full_id: full_id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: CellValue) -> Self {
        self.cells.push((key, value));
        self
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.cells.iter().find(|(k, _)| *k == key).map(|(_, v)| v)
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Drop the trailing "N item(s) found" line
    pub fn quiet(mut self, quiet: bool) -> Self {
        self.show_summary = !quiet;
        self
    }

    /// Output rows in the specified format
    pub fn output(&self, rows: &[TableRow], format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Csv => self.output_csv(rows)?,
            OutputFormat::Md => self.output_md(rows),
            OutputFormat::Id => self.output_ids(rows),
            _ => self.output_tsv(rows),
        }
        Ok(())
    }

    /// Calculate column widths from content, capped at each column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        let ref_width = rows
            .iter()
            .map(|r| r.reference.len())
            .max()
            .unwrap_or(3)
            .max(3); // "REF" header
        let mut widths = vec![ref_width];

        for col in self.columns {
            let max_content = rows
                .iter()
                .filter_map(|r| r.get(col.key))
                .map(|v| v.display_width())
                .max()
                .unwrap_or(0);
            widths.push(col.header.len().max(max_content).min(col.width));
        }

        widths
    }

    fn output_tsv(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let mut header_parts = vec![format!(
            "{:<width$}",
            style("REF").bold().dim(),
            width = widths[0]
        )];
        for (col, width) in self.columns.iter().zip(&widths[1..]) {
            header_parts.push(format!("{:<width$}", style(col.header).bold(), width = *width));
        }
        println!("{}", header_parts.join(" "));

        let total_width: usize = widths.iter().sum::<usize>() + widths.len() - 1;
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let mut row_parts = vec![format!(
                "{:<width$}",
                style(&row.reference).cyan(),
                width = widths[0]
            )];
            for (col, width) in self.columns.iter().zip(&widths[1..]) {
                match row.get(col.key) {
                    Some(value) => row_parts.push(value.format_tsv(*width)),
                    None => row_parts.push(format!("{:<width$}", "-", width = *width)),
                }
            }
            println!("{}", row_parts.join(" ").trim_end());
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_csv(&self, rows: &[TableRow]) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(std::io::stdout());

        let mut headers = vec!["ref", "id"];
        headers.extend(self.columns.iter().map(|c| c.key));
        wtr.write_record(&headers).into_diagnostic()?;

        for row in rows {
            let mut values = vec![row.reference.clone(), row.full_id.clone()];
            for col in self.columns {
                values.push(row.get(col.key).map(CellValue::raw).unwrap_or_default());
            }
            wtr.write_record(&values).into_diagnostic()?;
        }
        wtr.flush().into_diagnostic()
    }

    fn output_md(&self, rows: &[TableRow]) {
        let mut builder = Builder::default();

        let mut headers = vec!["Ref".to_string()];
        headers.extend(self.columns.iter().map(|c| c.header.to_string()));
        builder.push_record(headers);

        for row in rows {
            let mut values = vec![row.reference.clone()];
            for col in self.columns {
                values.push(
                    row.get(col.key)
                        .map(CellValue::format_md)
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
            builder.push_record(values);
        }

        println!("{}", builder.build().with(Style::markdown()));
    }

    fn output_ids(&self, rows: &[TableRow]) {
        for row in rows {
            println!("{}", row.full_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cell_value_text_format() {
        let cell = CellValue::Text("Hello World".to_string());
        assert!(cell.format_tsv(20).contains("Hello World"));
        assert_eq!(cell.raw(), "Hello World");
        assert_eq!(cell.format_md(), "Hello World");
    }

    #[test]
    fn test_missing_values() {
        let cell = CellValue::Date(None);
        assert_eq!(cell.raw(), "");
        assert_eq!(cell.format_md(), "-");
        assert_eq!(CellValue::Delivery(None).format_md(), "-");
        assert_eq!(CellValue::Budget(None).display_width(), 1);
    }

    #[test]
    fn test_domain_values() {
        assert_eq!(CellValue::Delivery(Some(DeliveryStatus::OnTime)).raw(), "On Time");
        assert_eq!(CellValue::Risk(RiskTier::Medium).raw(), "medium");
        assert_eq!(CellValue::Budget(Some(1_250_000)).raw(), "$1,250,000");
        assert_eq!(CellValue::Percent(40).raw(), "40%");
        assert_eq!(
            CellValue::Submittal(Some(SubmittalStatus::ReviseResubmit)).raw(),
            "R&R"
        );
    }

    #[test]
    fn test_cell_value_md_escapes_pipes() {
        let cell = CellValue::Text("a|b|c".to_string());
        assert_eq!(cell.format_md(), "a\\|b\\|c");
    }

    #[test]
    fn test_table_row_builder() {
        let row = TableRow::new("PRC@1", "PRC-123")
            .cell("title", CellValue::Text("Steel".to_string()))
            .cell("status", CellValue::Delivery(Some(DeliveryStatus::Delayed)));

        assert_eq!(row.full_id, "PRC-123");
        assert!(row.get("title").is_some());
        assert!(row.get("missing").is_none());
    }

    #[test]
    fn test_widths_are_capped() {
        let columns = [ColumnDef::new("title", "TITLE", 10)];
        let rows = vec![TableRow::new("PRC@1", "PRC-1")
            .cell("title", CellValue::Text("A very long product title".to_string()))];
        let widths = TableFormatter::new(&columns, "item").calculate_widths(&rows);
        assert_eq!(widths, vec![5, 10]);
    }
}
