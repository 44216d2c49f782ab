//! Group-by aggregate views over the augmented table.
//!
//! Every view reduces rows in table order into a `BTreeMap`, so the
//! summation order (and therefore every floating-point total) is fixed for a
//! given input.

use ordered_float::OrderedFloat;
use sales_core::AugmentedOrderLine;
use serde::Serialize;
use std::collections::BTreeMap;

/// Sales and volume totals for one dimension value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SalesTotals {
    /// Sum of Sales.
    pub sales: f64,
    /// Sum of QuantityOrdered.
    pub quantity_ordered: u64,
    /// Number of order lines.
    pub order_lines: u64,
}

impl SalesTotals {
    fn add(&mut self, row: &AugmentedOrderLine) {
        self.sales += row.sales;
        self.quantity_ordered += u64::from(row.line.quantity_ordered);
        self.order_lines += 1;
    }
}

/// Entry with the highest sales; ties go to the smallest key.
fn max_sales<K>(totals: &BTreeMap<K, SalesTotals>) -> Option<(&K, &SalesTotals)> {
    totals
        .iter()
        .rev()
        .max_by_key(|(_, t)| OrderedFloat(t.sales))
}

/// Totals per calendar month.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MonthView {
    totals: BTreeMap<u32, SalesTotals>,
}

impl MonthView {
    /// Build the view from an augmented table.
    pub fn from_table(table: &[AugmentedOrderLine]) -> Self {
        let mut totals: BTreeMap<u32, SalesTotals> = BTreeMap::new();
        for row in table {
            totals.entry(row.month).or_default().add(row);
        }
        Self { totals }
    }

    /// Totals for one month.
    pub fn get(&self, month: u32) -> Option<&SalesTotals> {
        self.totals.get(&month)
    }

    /// Months with data, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &SalesTotals)> {
        self.totals.iter().map(|(&m, t)| (m, t))
    }

    /// Month with the highest sales.
    pub fn best(&self) -> Option<(u32, &SalesTotals)> {
        max_sales(&self.totals).map(|(&m, t)| (m, t))
    }

    /// Sum of sales across months.
    pub fn total_sales(&self) -> f64 {
        self.totals.values().map(|t| t.sales).sum()
    }

    /// Sales for months 1 through 12; months without data are zero.
    pub fn sales_series(&self) -> Vec<(u32, f64)> {
        (1..=12)
            .map(|m| (m, self.get(m).map_or(0.0, |t| t.sales)))
            .collect()
    }
}

/// Totals per city, in lexical order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CityView {
    totals: BTreeMap<String, SalesTotals>,
}

impl CityView {
    /// Build the view from an augmented table.
    pub fn from_table(table: &[AugmentedOrderLine]) -> Self {
        let mut totals: BTreeMap<String, SalesTotals> = BTreeMap::new();
        for row in table {
            totals.entry(row.city.clone()).or_default().add(row);
        }
        Self { totals }
    }

    /// Totals for one city.
    pub fn get(&self, city: &str) -> Option<&SalesTotals> {
        self.totals.get(city)
    }

    /// Cities, lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SalesTotals)> {
        self.totals.iter().map(|(c, t)| (c.as_str(), t))
    }

    /// City with the highest sales.
    pub fn best(&self) -> Option<(&str, &SalesTotals)> {
        max_sales(&self.totals).map(|(c, t)| (c.as_str(), t))
    }

    /// Number of cities.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// True if there are no cities.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// Order line counts per hour of day.
#[derive(Debug, Clone, Default, Serialize)]
pub struct HourView {
    counts: BTreeMap<u32, u64>,
}

impl HourView {
    /// Build the view from an augmented table.
    pub fn from_table(table: &[AugmentedOrderLine]) -> Self {
        let mut counts: BTreeMap<u32, u64> = BTreeMap::new();
        for row in table {
            *counts.entry(row.hour).or_insert(0) += 1;
        }
        Self { counts }
    }

    /// Count for one hour.
    pub fn get(&self, hour: u32) -> u64 {
        self.counts.get(&hour).copied().unwrap_or(0)
    }

    /// Counts for hours 0 through 23; hours without orders are zero.
    pub fn series(&self) -> Vec<(u32, u64)> {
        (0..24).map(|h| (h, self.get(h))).collect()
    }

    /// The `n` busiest hours, by count descending then hour ascending.
    pub fn peak(&self, n: usize) -> Vec<(u32, u64)> {
        let mut hours: Vec<(u32, u64)> = self.counts.iter().map(|(&h, &c)| (h, c)).collect();
        hours.sort_by(|a, b| b.1.cmp(&a.1));
        hours.truncate(n);
        hours
    }

    /// Total order lines counted.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}

/// Volume and price totals for one product.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductTotals {
    /// Sum of QuantityOrdered.
    pub quantity_ordered: u64,
    /// Sum of PriceEach over order lines.
    pub price_sum: f64,
    /// Number of order lines.
    pub order_lines: u64,
}

impl ProductTotals {
    /// Mean PriceEach per order line.
    pub fn mean_price(&self) -> f64 {
        if self.order_lines > 0 {
            self.price_sum / self.order_lines as f64
        } else {
            0.0
        }
    }
}

/// Totals per product, in lexical order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductView {
    totals: BTreeMap<String, ProductTotals>,
}

impl ProductView {
    /// Build the view from an augmented table.
    pub fn from_table(table: &[AugmentedOrderLine]) -> Self {
        let mut totals: BTreeMap<String, ProductTotals> = BTreeMap::new();
        for row in table {
            let entry = totals.entry(row.line.product.clone()).or_default();
            entry.quantity_ordered += u64::from(row.line.quantity_ordered);
            entry.price_sum += row.line.price_each;
            entry.order_lines += 1;
        }
        Self { totals }
    }

    /// Totals for one product.
    pub fn get(&self, product: &str) -> Option<&ProductTotals> {
        self.totals.get(product)
    }

    /// Products, lexical order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ProductTotals)> {
        self.totals.iter().map(|(p, t)| (p.as_str(), t))
    }

    /// Product with the highest quantity ordered; ties go to the first name.
    pub fn top(&self) -> Option<(&str, &ProductTotals)> {
        self.totals
            .iter()
            .rev()
            .max_by_key(|(_, t)| t.quantity_ordered)
            .map(|(p, t)| (p.as_str(), t))
    }

    /// Number of products.
    pub fn len(&self) -> usize {
        self.totals.len()
    }

    /// True if there are no products.
    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }
}

/// All four aggregate views.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Aggregates {
    pub by_month: MonthView,
    pub by_city: CityView,
    pub by_hour: HourView,
    pub by_product: ProductView,
}

impl Aggregates {
    /// Compute every view from an augmented table.
    pub fn compute(table: &[AugmentedOrderLine]) -> Self {
        Self {
            by_month: MonthView::from_table(table),
            by_city: CityView::from_table(table),
            by_hour: HourView::from_table(table),
            by_product: ProductView::from_table(table),
        }
    }
}
