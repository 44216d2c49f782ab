//! Row cleaning and type coercion.
//!
//! Drops fully-empty rows and re-ingested header rows, then coerces every
//! remaining row into a typed [`OrderLine`]. A row that still fails coercion
//! is a data integrity violation and stops the run.

use sales_core::{
    config::CleaningConfig, parse_order_date, CleanTable, Error, OrderLine, RawOrderLine, Result,
};
use serde::Serialize;
use tracing::{debug, info, warn};

/// Minimum number of comma-separated segments in a purchase address.
pub const MIN_ADDRESS_SEGMENTS: usize = 3;

/// Rows dropped for one reason.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DroppedRows {
    /// Number of rows dropped.
    pub count: usize,
    /// First few dropped rows with their index in the unified table.
    pub samples: Vec<(usize, RawOrderLine)>,
}

impl DroppedRows {
    fn record(&mut self, index: usize, row: &RawOrderLine, max_samples: usize) {
        self.count += 1;
        if self.samples.len() < max_samples {
            self.samples.push((index, row.clone()));
        }
    }
}

/// Audit trail of a cleaning pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CleaningReport {
    /// Rows in the unified table.
    pub input_rows: usize,
    /// Rows with at least one empty field, before anything was dropped.
    pub rows_with_missing: usize,
    /// Rows where every field was empty.
    pub empty_rows: DroppedRows,
    /// Rows whose order date carried the header sentinel.
    pub header_rows: DroppedRows,
    /// Rows in the cleaned table.
    pub output_rows: usize,
}

impl CleaningReport {
    /// Total rows dropped.
    pub fn dropped(&self) -> usize {
        self.empty_rows.count + self.header_rows.count
    }
}

/// Cleans a unified table into typed order lines.
pub struct Cleaner {
    /// Order date prefix that marks a header row.
    header_sentinel: String,
    /// Samples kept per drop category.
    max_samples: usize,
}

impl Cleaner {
    /// Create a new cleaner.
    pub fn new(header_sentinel: impl Into<String>, max_samples: usize) -> Self {
        Self {
            header_sentinel: header_sentinel.into(),
            max_samples,
        }
    }

    /// Create a cleaner from configuration.
    pub fn from_config(config: &CleaningConfig) -> Self {
        Self::new(config.header_sentinel.clone(), config.max_samples)
    }

    /// Check if a row is a re-ingested header.
    pub fn is_header_row(&self, row: &RawOrderLine) -> bool {
        row.order_date.starts_with(&self.header_sentinel)
    }

    /// Clean the unified table.
    pub fn clean(&self, table: &[RawOrderLine]) -> Result<(CleanTable, CleaningReport)> {
        let mut report = CleaningReport {
            input_rows: table.len(),
            rows_with_missing: table.iter().filter(|r| r.has_empty_field()).count(),
            ..Default::default()
        };

        // Steps 1 and 2 are applied in order, so a row is attributed to the
        // first rule that drops it.
        let mut kept = Vec::with_capacity(table.len());
        for (index, row) in table.iter().enumerate() {
            if row.is_empty() {
                report.empty_rows.record(index, row, self.max_samples);
            } else if self.is_header_row(row) {
                report.header_rows.record(index, row, self.max_samples);
            } else {
                kept.push((index, row));
            }
        }

        let cleaned = kept
            .into_iter()
            .map(|(index, row)| coerce(index, row))
            .collect::<Result<CleanTable>>()?;
        report.output_rows = cleaned.len();

        if report.empty_rows.count > 0 {
            warn!(count = report.empty_rows.count, "dropped empty rows");
            for (index, _) in &report.empty_rows.samples {
                debug!(index, "empty row");
            }
        }
        if report.header_rows.count > 0 {
            warn!(
                count = report.header_rows.count,
                sentinel = %self.header_sentinel,
                "dropped header rows"
            );
            for (index, row) in &report.header_rows.samples {
                debug!(
                    index,
                    order_id = %row.order_id,
                    order_date = %row.order_date,
                    "header row"
                );
            }
        }
        info!(
            input = report.input_rows,
            output = report.output_rows,
            with_missing = report.rows_with_missing,
            "cleaned table"
        );

        Ok((cleaned, report))
    }
}

impl Default for Cleaner {
    fn default() -> Self {
        Self::from_config(&CleaningConfig::default())
    }
}

/// Coerce one surviving raw row into a typed order line.
fn coerce(index: usize, row: &RawOrderLine) -> Result<OrderLine> {
    let fail = |what: &str, value: &str| {
        Error::data_integrity(format!(
            "row {index} (order '{}'): {what} '{value}'",
            row.order_id
        ))
    };

    let quantity_ordered = row
        .quantity_ordered
        .trim()
        .parse::<u32>()
        .ok()
        .filter(|q| *q > 0)
        .ok_or_else(|| fail("invalid quantity", &row.quantity_ordered))?;

    let price_each = row
        .price_each
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite() && *p >= 0.0)
        .ok_or_else(|| fail("invalid price", &row.price_each))?;

    let order_date = parse_order_date(&row.order_date)
        .ok_or_else(|| fail("invalid order date", &row.order_date))?;

    if row.purchase_address.split(',').count() < MIN_ADDRESS_SEGMENTS {
        return Err(fail("malformed address", &row.purchase_address));
    }

    Ok(OrderLine {
        order_id: row.order_id.trim().to_string(),
        product: row.product.trim().to_string(),
        quantity_ordered,
        price_each,
        order_date,
        purchase_address: row.purchase_address.clone(),
    })
}
