//! Data ingestion and cleaning for the retail sales pipeline.
//!
//! This crate handles:
//! - Source file discovery and CSV reading
//! - Concatenation into one unified table
//! - Dropping empty and re-ingested header rows
//! - Type coercion into clean order lines
//! - Writing tables back out as CSV

pub mod reader;
pub mod cleaner;
pub mod writer;

pub use reader::{Ingested, Ingestor, SourceFile};
pub use cleaner::{Cleaner, CleaningReport, DroppedRows};
pub use writer::{write_table, write_table_to_path};
