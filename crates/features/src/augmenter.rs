//! Derived column computation.
//!
//! Adds Month, Sales, City, Hour and Minute to every cleaned order line.
//! No rows are dropped here: a row that cannot be augmented stops the run.

use crate::city::parse_city;
use sales_core::{AugmentedOrderLine, AugmentedTable, OrderLine, Result};
use tracing::debug;

/// Augments cleaned order lines with analytical columns.
#[derive(Debug, Default, Clone, Copy)]
pub struct Augmenter;

impl Augmenter {
    /// Create a new augmenter.
    pub fn new() -> Self {
        Self
    }

    /// Augment a single order line.
    pub fn augment_line(&self, line: &OrderLine) -> Result<AugmentedOrderLine> {
        let city = parse_city(&line.purchase_address)?;
        Ok(AugmentedOrderLine::new(line.clone(), city))
    }

    /// Augment every line of a cleaned table, preserving order.
    pub fn augment(&self, table: &[OrderLine]) -> Result<AugmentedTable> {
        let augmented = table
            .iter()
            .map(|line| self.augment_line(line))
            .collect::<Result<AugmentedTable>>()?;
        debug!(rows = augmented.len(), "augmented table");
        Ok(augmented)
    }
}
