//! Business-question report.
//!
//! Turns the aggregate views and pair counts into one answer per question:
//! a headline finding, a table and chart-ready series. Currency values are
//! rounded here and nowhere earlier.

use crate::aggregator::Aggregates;
use crate::co_occurrence::CoOccurrence;
use chrono::Month;
use sales_core::{round_currency, Config, Result, TabularRow, SOURCE_COLUMNS};
use sales_ingestion::{CleaningReport, DroppedRows};
use serde::Serialize;
use std::fmt;

/// How a series is meant to be drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Bar,
    Line,
}

/// One chart-ready series: category labels and their values.
#[derive(Debug, Clone, Serialize)]
pub struct ChartSeries {
    pub kind: ChartKind,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub labels: Vec<String>,
    pub values: Vec<f64>,
}

impl ChartSeries {
    fn new(kind: ChartKind, title: &str, x_label: &str, y_label: &str) -> Self {
        Self {
            kind,
            title: title.to_string(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            labels: Vec::new(),
            values: Vec::new(),
        }
    }

    fn push(&mut self, label: impl Into<String>, value: f64) {
        self.labels.push(label.into());
        self.values.push(value);
    }
}

/// A rendered aggregate table.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ReportTable {
    fn new(columns: &[&str]) -> Self {
        Self {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

fn write_row(f: &mut fmt::Formatter<'_>, cells: &[String], widths: &[usize]) -> fmt::Result {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(c, &w)| format!("{c:<w$}"))
        .collect();
    writeln!(f, "  {}", padded.join("  ").trim_end())
}

impl fmt::Display for ReportTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut widths: Vec<usize> = self.columns.iter().map(|c| c.len()).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.len());
            }
        }

        write_row(f, &self.columns, &widths)?;
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        write_row(f, &rule, &widths)?;
        for row in &self.rows {
            write_row(f, row, &widths)?;
        }
        Ok(())
    }
}

/// Answer to one business question.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub question: String,
    pub finding: String,
    pub table: ReportTable,
    /// Supporting rows behind the table, when the question has any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<ReportTable>,
    pub charts: Vec<ChartSeries>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthHighlight {
    pub month: u32,
    pub name: String,
    pub sales: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CityHighlight {
    pub city: String,
    pub sales: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct HourCount {
    pub hour: u32,
    pub orders: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PairHighlight {
    pub first: String,
    pub second: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductHighlight {
    pub product: String,
    pub quantity_ordered: u64,
    pub mean_price: f64,
}

/// The full report: cleaning audit, headline values and one answer per question.
#[derive(Debug, Clone, Serialize)]
pub struct SalesReport {
    pub cleaning: CleaningReport,
    pub best_month: Option<MonthHighlight>,
    pub top_city: Option<CityHighlight>,
    pub peak_hours: Vec<HourCount>,
    pub grouped_orders: usize,
    pub top_pairs: Vec<PairHighlight>,
    pub top_product: Option<ProductHighlight>,
    pub answers: Vec<Answer>,
}

/// English month name, or the number if out of range.
pub fn month_name(month: u32) -> String {
    u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .map_or_else(|| month.to_string(), |m| m.name().to_string())
}

/// Format a currency amount as `$1,234.56`.
pub fn format_currency(value: f64, precision: u32) -> String {
    let rounded = round_currency(value, precision);
    let text = format!("{:.*}", precision as usize, rounded.abs());
    let (whole, frac) = match text.split_once('.') {
        Some((w, f)) => (w, Some(f)),
        None => (text.as_str(), None),
    };

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded < 0.0 { "-" } else { "" };
    match frac {
        Some(f) => format!("{sign}${grouped}.{f}"),
        None => format!("{sign}${grouped}"),
    }
}

impl SalesReport {
    /// Build the report from the cleaning audit, aggregates and pair counts.
    pub fn build(
        cleaning: &CleaningReport,
        aggregates: &Aggregates,
        co_occurrence: &CoOccurrence,
        config: &Config,
    ) -> Self {
        let precision = config.report.currency_precision;
        let money = |v: f64| round_currency(v, precision);

        let best_month = aggregates.by_month.best().map(|(month, totals)| MonthHighlight {
            month,
            name: month_name(month),
            sales: money(totals.sales),
        });
        let top_city = aggregates.by_city.best().map(|(city, totals)| CityHighlight {
            city: city.to_string(),
            sales: money(totals.sales),
        });
        let peak_hours = aggregates
            .by_hour
            .peak(config.report.peak_hours)
            .into_iter()
            .map(|(hour, orders)| HourCount { hour, orders })
            .collect();
        let top_pairs = co_occurrence
            .pairs
            .most_common(config.analysis.top_pairs)
            .into_iter()
            .map(|(pair, count)| PairHighlight {
                first: pair.first,
                second: pair.second,
                count,
            })
            .collect();
        let top_product = aggregates.by_product.top().map(|(product, totals)| ProductHighlight {
            product: product.to_string(),
            quantity_ordered: totals.quantity_ordered,
            mean_price: money(totals.mean_price()),
        });

        let mut report = Self {
            cleaning: cleaning.clone(),
            best_month,
            top_city,
            peak_hours,
            grouped_orders: co_occurrence.groups.len(),
            top_pairs,
            top_product,
            answers: Vec::new(),
        };
        report.answers = vec![
            report.month_answer(aggregates, precision),
            report.city_answer(aggregates, precision),
            report.hour_answer(aggregates),
            report.pair_answer(co_occurrence, config.report.grouped_samples),
            report.product_answer(aggregates, precision),
        ];
        report
    }

    fn month_answer(&self, aggregates: &Aggregates, precision: u32) -> Answer {
        let mut table = ReportTable::new(&["Month", "Quantity Ordered", "Sales"]);
        for (month, totals) in aggregates.by_month.iter() {
            table.push(vec![
                month.to_string(),
                totals.quantity_ordered.to_string(),
                format_currency(totals.sales, precision),
            ]);
        }

        let mut chart =
            ChartSeries::new(ChartKind::Bar, "Sales by month", "Month Number", "Sales in USD ($)");
        for (month, sales) in aggregates.by_month.sales_series() {
            chart.push(month.to_string(), round_currency(sales, precision));
        }

        let finding = match &self.best_month {
            Some(best) => format!(
                "The best month for sales was {}. A total of {} was earned in {}.",
                best.name,
                format_currency(best.sales, precision),
                best.name
            ),
            None => "No sales recorded.".to_string(),
        };

        Answer {
            question: "What was the best month for sales? How much was earned that month?".to_string(),
            finding,
            table,
            detail: None,
            charts: vec![chart],
        }
    }

    fn city_answer(&self, aggregates: &Aggregates, precision: u32) -> Answer {
        let mut table = ReportTable::new(&["City", "Quantity Ordered", "Sales"]);
        let mut chart =
            ChartSeries::new(ChartKind::Bar, "Sales by city", "City Name", "Sales in USD ($)");
        for (city, totals) in aggregates.by_city.iter() {
            table.push(vec![
                city.to_string(),
                totals.quantity_ordered.to_string(),
                format_currency(totals.sales, precision),
            ]);
            chart.push(city, round_currency(totals.sales, precision));
        }

        let finding = match &self.top_city {
            Some(top) => format!(
                "The city with the highest sales is {} with a total of {}.",
                top.city,
                format_currency(top.sales, precision)
            ),
            None => "No sales recorded.".to_string(),
        };

        Answer {
            question: "What city has the highest number of sales?".to_string(),
            finding,
            table,
            detail: None,
            charts: vec![chart],
        }
    }

    fn hour_answer(&self, aggregates: &Aggregates) -> Answer {
        let mut table = ReportTable::new(&["Hour", "Orders"]);
        let mut chart =
            ChartSeries::new(ChartKind::Line, "Orders by hour", "Hour", "Number of Orders");
        for (hour, orders) in aggregates.by_hour.series() {
            table.push(vec![hour.to_string(), orders.to_string()]);
            chart.push(hour.to_string(), orders as f64);
        }

        let finding = if self.peak_hours.is_empty() {
            "No orders recorded.".to_string()
        } else {
            let hours: Vec<String> = self
                .peak_hours
                .iter()
                .map(|h| format!("{:02}:00 ({} orders)", h.hour, h.orders))
                .collect();
            format!("Orders peak around {}.", hours.join(" and "))
        };

        Answer {
            question: "What time should we display advertisements to maximize the likelihood of customers buying?"
                .to_string(),
            finding,
            table,
            detail: None,
            charts: vec![chart],
        }
    }

    fn pair_answer(&self, co_occurrence: &CoOccurrence, grouped_samples: usize) -> Answer {
        let mut table = ReportTable::new(&["Product", "Product", "Count"]);
        let mut chart =
            ChartSeries::new(ChartKind::Bar, "Products sold together", "Product Pair", "Orders");
        for pair in &self.top_pairs {
            table.push(vec![pair.first.clone(), pair.second.clone(), pair.count.to_string()]);
            chart.push(format!("{} + {}", pair.first, pair.second), pair.count as f64);
        }

        let finding = match self.top_pairs.first() {
            Some(top) => format!(
                "The products most often sold together are {} and {}, sold together {} times across {} multi-item orders.",
                top.first, top.second, top.count, self.grouped_orders
            ),
            None => "No multi-item orders recorded.".to_string(),
        };

        let mut grouped = ReportTable::new(&["Order ID", "Grouped"]);
        for group in co_occurrence.groups.iter().take(grouped_samples) {
            grouped.push(vec![group.order_id.clone(), group.joined()]);
        }

        Answer {
            question: "What products are most often sold together?".to_string(),
            finding,
            table,
            detail: Some(grouped),
            charts: vec![chart],
        }
    }

    fn product_answer(&self, aggregates: &Aggregates, precision: u32) -> Answer {
        let mut table = ReportTable::new(&["Product", "Quantity Ordered", "Mean Price"]);
        let mut quantity = ChartSeries::new(
            ChartKind::Bar,
            "Quantity ordered by product",
            "Product Name",
            "Quantity Ordered",
        );
        let mut price =
            ChartSeries::new(ChartKind::Line, "Mean price by product", "Product Name", "Price ($)");
        for (product, totals) in aggregates.by_product.iter() {
            table.push(vec![
                product.to_string(),
                totals.quantity_ordered.to_string(),
                format_currency(totals.mean_price(), precision),
            ]);
            quantity.push(product, totals.quantity_ordered as f64);
            price.push(product, round_currency(totals.mean_price(), precision));
        }

        let finding = match &self.top_product {
            Some(top) => format!(
                "The product that sold the most was {} with {} units at a mean price of {}.",
                top.product,
                top.quantity_ordered,
                format_currency(top.mean_price, precision)
            ),
            None => "No products recorded.".to_string(),
        };

        Answer {
            question: "What product sold the most? Why did it sell the most?".to_string(),
            finding,
            table,
            detail: None,
            charts: vec![quantity, price],
        }
    }

    /// Serialize the report as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Sampled dropped rows, prefixed with their index in the unified table.
fn dropped_table(rows: &DroppedRows) -> ReportTable {
    let columns: Vec<&str> = std::iter::once("Row").chain(SOURCE_COLUMNS).collect();
    let mut table = ReportTable::new(&columns);
    for (index, row) in &rows.samples {
        let mut cells = vec![index.to_string()];
        cells.extend(row.record());
        table.push(cells);
    }
    table
}

fn write_dropped(f: &mut fmt::Formatter<'_>, label: &str, rows: &DroppedRows) -> fmt::Result {
    if rows.count == 0 {
        return Ok(());
    }
    writeln!(f)?;
    writeln!(f, "{label} ({} dropped, {} shown):", rows.count, rows.samples.len())?;
    write!(f, "{}", dropped_table(rows))
}

impl fmt::Display for SalesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cleaning = &self.cleaning;
        writeln!(
            f,
            "Data cleaning: {} rows read, {} with missing values, {} dropped, {} kept",
            cleaning.input_rows,
            cleaning.rows_with_missing,
            cleaning.dropped(),
            cleaning.output_rows
        )?;
        write_dropped(f, "Empty rows", &cleaning.empty_rows)?;
        write_dropped(f, "Header rows", &cleaning.header_rows)?;

        for (i, answer) in self.answers.iter().enumerate() {
            writeln!(f)?;
            writeln!(f, "Question {}: {}", i + 1, answer.question)?;
            writeln!(f)?;
            write!(f, "{}", answer.table)?;
            if let Some(detail) = &answer.detail {
                writeln!(f)?;
                write!(f, "{detail}")?;
            }
            writeln!(f)?;
            writeln!(f, "{}", answer.finding)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sales_core::{parse_order_date, AugmentedOrderLine, OrderLine, RawOrderLine};

    fn make_row(
        order_id: &str,
        product: &str,
        qty: u32,
        price: f64,
        date: &str,
        city: &str,
    ) -> AugmentedOrderLine {
        let line = OrderLine {
            order_id: order_id.to_string(),
            product: product.to_string(),
            quantity_ordered: qty,
            price_each: price,
            order_date: parse_order_date(date).unwrap(),
            purchase_address: "1 A St, Somewhere, XX 00000".to_string(),
        };
        AugmentedOrderLine::new(line, city.to_string())
    }

    fn sample_report() -> SalesReport {
        let table = vec![
            make_row("1", "iPhone", 1, 700.0, "12/01/19 12:00", "San Francisco (CA)"),
            make_row(
                "1",
                "Lightning Charging Cable",
                1,
                14.95,
                "12/01/19 12:00",
                "San Francisco (CA)",
            ),
            make_row("2", "AAA Batteries (4-pack)", 4, 2.99, "01/15/19 19:30", "Boston (MA)"),
        ];
        let aggregates = Aggregates::compute(&table);
        let co = CoOccurrence::compute(&table, true);
        SalesReport::build(&CleaningReport::default(), &aggregates, &co, &Config::default())
    }

    fn header_row() -> RawOrderLine {
        RawOrderLine {
            order_id: "Order ID".to_string(),
            product: "Product".to_string(),
            quantity_ordered: "Quantity Ordered".to_string(),
            price_each: "Price Each".to_string(),
            order_date: "Order Date".to_string(),
            purchase_address: "Purchase Address".to_string(),
        }
    }

    #[test]
    fn test_month_name() {
        assert_eq!(month_name(12), "December");
        assert_eq!(month_name(1), "January");
        assert_eq!(month_name(13), "13");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(4613443.3449, 2), "$4,613,443.34");
        assert_eq!(format_currency(999.999, 2), "$1,000.00");
        assert_eq!(format_currency(12.0, 0), "$12");
        assert_eq!(format_currency(-1234.5, 1), "-$1,234.5");
    }

    #[test]
    fn test_headlines() {
        let report = sample_report();

        let best = report.best_month.as_ref().unwrap();
        assert_eq!(best.month, 12);
        assert_eq!(best.sales, 714.95);
        assert_eq!(report.top_city.as_ref().unwrap().city, "San Francisco (CA)");
        assert_eq!(report.peak_hours[0].hour, 12);
        assert_eq!(report.grouped_orders, 1);
        assert_eq!(report.top_pairs.len(), 1);
        assert_eq!(report.top_pairs[0].first, "Lightning Charging Cable");
        assert_eq!(report.top_product.as_ref().unwrap().product, "AAA Batteries (4-pack)");
    }

    #[test]
    fn test_answers_have_charts() {
        let report = sample_report();

        assert_eq!(report.answers.len(), 5);
        assert_eq!(report.answers[0].charts[0].labels.len(), 12);
        assert_eq!(report.answers[2].charts[0].kind, ChartKind::Line);
        assert_eq!(report.answers[2].charts[0].values.len(), 24);
        assert_eq!(report.answers[4].charts.len(), 2);
        assert_eq!(
            report.answers[4].charts[0].labels,
            report.answers[4].charts[1].labels
        );
        assert!(report.answers[0].finding.contains("December"));
        assert!(report.answers[0].finding.contains("$714.95"));
    }

    #[test]
    fn test_text_and_json_output() {
        let report = sample_report();

        let text = report.to_string();
        assert!(text.contains("Question 1:"));
        assert!(text.contains("Question 5:"));
        assert!(text.contains("San Francisco (CA)"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["best_month"]["name"], "December");
        assert_eq!(json["answers"][2]["charts"][0]["kind"], "line");
    }

    #[test]
    fn test_cleaning_audit_is_reported() {
        let mut cleaning = CleaningReport {
            input_rows: 5,
            rows_with_missing: 1,
            output_rows: 3,
            ..Default::default()
        };
        cleaning.empty_rows.count = 1;
        cleaning.empty_rows.samples.push((1, RawOrderLine::default()));
        cleaning.header_rows.count = 1;
        cleaning.header_rows.samples.push((3, header_row()));

        let table = vec![make_row("1", "iPhone", 1, 700.0, "12/01/19 12:00", "Boston (MA)")];
        let aggregates = Aggregates::compute(&table);
        let co = CoOccurrence::compute(&table, true);
        let report = SalesReport::build(&cleaning, &aggregates, &co, &Config::default());

        let text = report.to_string();
        assert!(text.contains("5 rows read, 1 with missing values, 2 dropped, 3 kept"));
        assert!(text.contains("Empty rows (1 dropped, 1 shown):"));
        assert!(text.contains("Header rows (1 dropped, 1 shown):"));
        assert!(text.contains("Order Date"));

        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["cleaning"]["empty_rows"]["count"], 1);
        assert_eq!(json["cleaning"]["header_rows"]["samples"][0][0], 3);
        assert_eq!(
            json["cleaning"]["header_rows"]["samples"][0][1]["order_date"],
            "Order Date"
        );
    }

    #[test]
    fn test_clean_run_lists_no_dropped_rows() {
        let text = sample_report().to_string();
        assert!(text.starts_with("Data cleaning: 0 rows read"));
        assert!(!text.contains("Empty rows"));
        assert!(!text.contains("Header rows"));
    }

    #[test]
    fn test_pair_answer_lists_grouped_orders() {
        let report = sample_report();
        let detail = report.answers[3].detail.as_ref().unwrap();

        assert_eq!(detail.columns, vec!["Order ID", "Grouped"]);
        assert_eq!(detail.rows.len(), 1);
        assert_eq!(detail.rows[0], vec!["1", "iPhone,Lightning Charging Cable"]);
        assert!(report.answers[0].detail.is_none());
        assert!(report.to_string().contains("iPhone,Lightning Charging Cable"));
    }

    #[test]
    fn test_grouped_orders_are_capped() {
        let table: Vec<AugmentedOrderLine> = (0..4)
            .flat_map(|i| {
                let id = i.to_string();
                [
                    make_row(&id, "A", 1, 1.0, "01/01/19 10:00", "Boston (MA)"),
                    make_row(&id, "B", 1, 1.0, "01/01/19 10:00", "Boston (MA)"),
                ]
            })
            .collect();
        let aggregates = Aggregates::compute(&table);
        let co = CoOccurrence::compute(&table, true);
        let mut config = Config::default();
        config.report.grouped_samples = 2;
        let report = SalesReport::build(&CleaningReport::default(), &aggregates, &co, &config);

        assert_eq!(report.grouped_orders, 4);
        let detail = report.answers[3].detail.as_ref().unwrap();
        assert_eq!(detail.rows.len(), 2);
        assert_eq!(detail.rows[1][0], "1");
    }
}
