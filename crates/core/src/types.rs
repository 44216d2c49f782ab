//! Core data types for the retail sales pipeline.

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

/// Source column headers, in file order.
pub const ORDER_ID: &str = "Order ID";
pub const PRODUCT: &str = "Product";
pub const QUANTITY_ORDERED: &str = "Quantity Ordered";
pub const PRICE_EACH: &str = "Price Each";
pub const ORDER_DATE: &str = "Order Date";
pub const PURCHASE_ADDRESS: &str = "Purchase Address";

/// All source columns, in file order.
pub const SOURCE_COLUMNS: [&str; 6] = [
    ORDER_ID,
    PRODUCT,
    QUANTITY_ORDERED,
    PRICE_EACH,
    ORDER_DATE,
    PURCHASE_ADDRESS,
];

/// Columns appended by augmentation.
pub const DERIVED_COLUMNS: [&str; 5] = ["Month", "Sales", "City", "Hour", "Minute"];

/// Text format of the `Order Date` column (e.g. `04/19/19 08:46`).
pub const ORDER_DATE_FORMAT: &str = "%m/%d/%y %H:%M";

/// Parse an `Order Date` value.
pub fn parse_order_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), ORDER_DATE_FORMAT).ok()
}

/// Format a timestamp back into the source `Order Date` format.
pub fn format_order_date(ts: &NaiveDateTime) -> String {
    ts.format(ORDER_DATE_FORMAT).to_string()
}

/// A row that can be written as one CSV record.
pub trait TabularRow {
    /// Column headers, in record order.
    fn headers() -> Vec<&'static str>;

    /// Field values, in header order.
    fn record(&self) -> Vec<String>;
}

/// One untyped row exactly as read from a source file.
///
/// Missing values are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrderLine {
    pub order_id: String,
    pub product: String,
    pub quantity_ordered: String,
    pub price_each: String,
    pub order_date: String,
    pub purchase_address: String,
}

impl RawOrderLine {
    /// Field values in source column order.
    pub fn fields(&self) -> [&str; 6] {
        [
            self.order_id.as_str(),
            self.product.as_str(),
            self.quantity_ordered.as_str(),
            self.price_each.as_str(),
            self.order_date.as_str(),
            self.purchase_address.as_str(),
        ]
    }

    /// True if every field is empty.
    pub fn is_empty(&self) -> bool {
        self.fields().iter().all(|f| f.trim().is_empty())
    }

    /// True if at least one field is empty.
    pub fn has_empty_field(&self) -> bool {
        self.fields().iter().any(|f| f.trim().is_empty())
    }
}

impl TabularRow for RawOrderLine {
    fn headers() -> Vec<&'static str> {
        SOURCE_COLUMNS.to_vec()
    }

    fn record(&self) -> Vec<String> {
        self.fields().iter().map(|f| f.to_string()).collect()
    }
}

/// A cleaned, typed order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    /// Order identifier; shared by every line of a multi-item order.
    pub order_id: String,
    pub product: String,
    /// Always positive after cleaning.
    pub quantity_ordered: u32,
    /// Always finite and non-negative after cleaning.
    pub price_each: f64,
    pub order_date: NaiveDateTime,
    pub purchase_address: String,
}

/// An order line with the derived analytical columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AugmentedOrderLine {
    pub line: OrderLine,
    /// 1..=12.
    pub month: u32,
    /// Quantity × price at full precision.
    pub sales: f64,
    /// "Name (ST)".
    pub city: String,
    /// 0..=23.
    pub hour: u32,
    /// 0..=59.
    pub minute: u32,
}

impl AugmentedOrderLine {
    /// Build the derived columns that depend only on the order line itself.
    ///
    /// City parsing lives in the features crate; the caller supplies it.
    pub fn new(line: OrderLine, city: String) -> Self {
        let sales = line.quantity_ordered as f64 * line.price_each;
        Self {
            month: line.order_date.month(),
            hour: line.order_date.hour(),
            minute: line.order_date.minute(),
            sales,
            city,
            line,
        }
    }
}

impl TabularRow for AugmentedOrderLine {
    fn headers() -> Vec<&'static str> {
        SOURCE_COLUMNS
            .iter()
            .chain(DERIVED_COLUMNS.iter())
            .copied()
            .collect()
    }

    fn record(&self) -> Vec<String> {
        vec![
            self.line.order_id.clone(),
            self.line.product.clone(),
            self.line.quantity_ordered.to_string(),
            self.line.price_each.to_string(),
            format_order_date(&self.line.order_date),
            self.line.purchase_address.clone(),
            self.month.to_string(),
            self.sales.to_string(),
            self.city.clone(),
            self.hour.to_string(),
            self.minute.to_string(),
        ]
    }
}

/// The unified table as ingested.
pub type RawTable = Vec<RawOrderLine>;

/// The table after cleaning.
pub type CleanTable = Vec<OrderLine>;

/// The table after augmentation.
pub type AugmentedTable = Vec<AugmentedOrderLine>;

/// Round a currency amount for presentation.
#[inline]
pub fn round_currency(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn make_line(qty: u32, price: f64, date: &str) -> OrderLine {
        OrderLine {
            order_id: "176558".to_string(),
            product: "USB-C Charging Cable".to_string(),
            quantity_ordered: qty,
            price_each: price,
            order_date: parse_order_date(date).unwrap(),
            purchase_address: "917 1st St, Dallas, TX 75001".to_string(),
        }
    }

    #[test]
    fn test_parse_order_date() {
        let ts = parse_order_date("04/19/19 08:46").unwrap();
        assert_eq!(ts.month(), 4);
        assert_eq!(ts.day(), 19);
        assert_eq!(ts.year(), 2019);
        assert_eq!(ts.hour(), 8);
        assert_eq!(ts.minute(), 46);
        assert!(parse_order_date("Order Date").is_none());
    }

    #[test]
    fn test_format_order_date_matches_source() {
        let ts = parse_order_date("12/30/19 00:01").unwrap();
        assert_eq!(format_order_date(&ts), "12/30/19 00:01");
    }

    #[test]
    fn test_raw_line_emptiness() {
        let empty = RawOrderLine::default();
        assert!(empty.is_empty());
        assert!(empty.has_empty_field());

        let partial = RawOrderLine {
            order_id: "1".to_string(),
            ..Default::default()
        };
        assert!(!partial.is_empty());
        assert!(partial.has_empty_field());
    }

    #[test]
    fn test_augmented_line_derives_columns() {
        let line = make_line(2, 11.95, "04/07/19 22:30");
        let aug = AugmentedOrderLine::new(line, "Dallas (TX)".into());
        assert_eq!(aug.month, 4);
        assert_eq!(aug.hour, 22);
        assert_eq!(aug.minute, 30);
        assert_eq!(aug.sales, 2.0 * 11.95);
    }

    #[test]
    fn test_augmented_record_matches_headers() {
        let line = make_line(1, 11.95, "04/07/19 22:30");
        let aug = AugmentedOrderLine::new(line, "Dallas (TX)".into());
        let headers = AugmentedOrderLine::headers();
        let record = aug.record();
        assert_eq!(headers.len(), 11);
        assert_eq!(record.len(), headers.len());
        assert_eq!(record[3], "11.95");
        assert_eq!(record[4], "04/07/19 22:30");
        assert_eq!(record[8], "Dallas (TX)");
    }

    #[test]
    fn test_round_currency() {
        assert_relative_eq!(round_currency(4613443.3449, 2), 4613443.34);
        assert_relative_eq!(round_currency(1.005, 0), 1.0);
    }
}
