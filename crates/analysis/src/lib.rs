//! Aggregation and reporting for the retail sales pipeline.
//!
//! This crate provides:
//! - Month, City, Hour and Product aggregate views
//! - Product co-occurrence counting for multi-line orders
//! - The business-question report with chart-ready series
//! - The end-to-end pipeline

pub mod aggregator;
pub mod co_occurrence;
pub mod report;
pub mod pipeline;

pub use aggregator::{Aggregates, CityView, HourView, MonthView, ProductView};
pub use co_occurrence::{CoOccurrence, OrderGroup, PairCounts, ProductPair};
pub use report::{ChartKind, ChartSeries, SalesReport};
pub use pipeline::{Pipeline, PipelineOutput};
