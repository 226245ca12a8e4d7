//! Line-oriented text rendering of an inspection run.

use std::error::Error;
use std::io::{self, Write};

use crate::record::{ColumnInfo, Record};

/// Related rows found in one auxiliary table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelatedSection {
    pub table: String,
    /// `None` when no column looked like an order reference.
    pub reference_column: Option<String>,
    pub records: Vec<Record>,
    /// Set when the table could not be read; the sweep moves on.
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    NotFound,
    Found {
        order: Record,
        related: Vec<RelatedSection>,
    },
}

/// Everything gathered about one order identifier.
///
/// Filled in step by step, so a run that fails part way still holds what it
/// had found up to that point. `None` marks a step that never completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderReport {
    pub identifier: String,
    pub tables: Option<Vec<String>>,
    pub order_tables: Vec<String>,
    pub orders_table: Option<String>,
    pub columns: Option<Vec<ColumnInfo>>,
    pub outcome: Option<LookupOutcome>,
}

impl OrderReport {
    pub fn new(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            tables: None,
            order_tables: Vec::new(),
            orders_table: None,
            columns: None,
            outcome: None,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self.outcome, Some(LookupOutcome::Found { .. }))
    }

    /// Related tables whose rows could not be read.
    pub fn failed_sections(&self) -> impl Iterator<Item = &RelatedSection> {
        let related: &[RelatedSection] = match &self.outcome {
            Some(LookupOutcome::Found { related, .. }) => related.as_slice(),
            _ => &[],
        };
        related.iter().filter(|s| s.error.is_some())
    }

    /// Write every completed step, stopping at the first missing one.
    pub fn render<W: Write>(&self, out: &mut W) -> io::Result<()> {
        writeln!(out, "===== CHECKING ORDER {} =====", self.identifier)?;

        let Some(tables) = &self.tables else {
            return Ok(());
        };
        writeln!(out, "Tables in database: {}", tables.join(", "))?;
        writeln!(out, "Order-related tables: {}", self.order_tables.join(", "))?;

        let Some(orders_table) = &self.orders_table else {
            if self.order_tables.is_empty() {
                writeln!(out, "No order-related tables found!")?;
            }
            return Ok(());
        };
        writeln!(out, "Using table: {orders_table}")?;

        let Some(columns) = &self.columns else {
            return Ok(());
        };
        let column_names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
        writeln!(out, "Columns in {orders_table}: {}", column_names.join(", "))?;

        let (order, related) = match &self.outcome {
            None => return Ok(()),
            Some(LookupOutcome::NotFound) => {
                writeln!(out, "Order {} not found!", self.identifier)?;
                return Ok(());
            }
            Some(LookupOutcome::Found { order, related }) => (order, related),
        };

        writeln!(out)?;
        writeln!(out, "===== ORDER DETAILS =====")?;
        if !order.is_empty() {
            writeln!(out, "{order}")?;
        }

        writeln!(out)?;
        writeln!(out, "===== CHECKING RELATED TABLES =====")?;
        if related.is_empty() {
            writeln!(out, "No related tables found.")?;
        }
        for section in related {
            render_section(section, out)?;
        }
        Ok(())
    }
}

fn render_section<W: Write>(section: &RelatedSection, out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Checking table: {}", section.table)?;

    if let Some(error) = &section.error {
        writeln!(out, "Failed to read related records: {error}")?;
        return Ok(());
    }

    if section.reference_column.is_none() {
        writeln!(out, "No order reference column found; skipping.")?;
        return Ok(());
    }

    if section.records.is_empty() {
        writeln!(out, "No related records found.")?;
        return Ok(());
    }

    writeln!(out, "Found {} related records:", section.records.len())?;
    for (i, record) in section.records.iter().enumerate() {
        writeln!(out, "--- record {} ---", i + 1)?;
        if !record.is_empty() {
            writeln!(out, "{record}")?;
        }
    }
    Ok(())
}

/// Print a failure and its cause chain in the same text style as the report.
///
/// A cause whose text is already part of the line above it is not repeated.
pub fn render_error<W: Write>(err: &(dyn Error + 'static), out: &mut W) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "===== ERROR =====")?;
    let mut last = err.to_string();
    writeln!(out, "An error occurred: {last}")?;

    let mut source = err.source();
    let mut header_written = false;
    while let Some(cause) = source {
        let text = cause.to_string();
        if !last.contains(&text) {
            if !header_written {
                writeln!(out, "Caused by:")?;
                header_written = true;
            }
            writeln!(out, "  {text}")?;
        }
        last = text;
        source = cause.source();
    }
    writeln!(out, "=================")
}
