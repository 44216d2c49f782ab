//! End-to-end reporting pipeline.
//!
//! Runs ingest → clean → augment → aggregate → co-occurrence → report for one
//! input directory. Each stage takes the previous stage's table by reference
//! and returns a new one.

use crate::aggregator::Aggregates;
use crate::co_occurrence::CoOccurrence;
use crate::report::SalesReport;
use sales_core::{AugmentedTable, Config, Result};
use sales_features::Augmenter;
use sales_ingestion::{write_table_to_path, Cleaner, CleaningReport, Ingested, Ingestor};
use tracing::info;

/// Everything a pipeline run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Unified table and the files it came from.
    pub ingested: Ingested,
    /// What cleaning dropped.
    pub cleaning: CleaningReport,
    /// Cleaned and augmented table.
    pub table: AugmentedTable,
    /// Month, City, Hour and Product views.
    pub aggregates: Aggregates,
    /// Multi-line orders and pair counts.
    pub co_occurrence: CoOccurrence,
    /// Business-question answers.
    pub report: SalesReport,
}

/// Reporting pipeline for one configuration.
pub struct Pipeline {
    config: Config,
}

impl Pipeline {
    /// Create a pipeline; fails if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration in use.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run every stage.
    pub fn run(&self) -> Result<PipelineOutput> {
        let ingest = &self.config.ingest;

        let ingested = Ingestor::from_config(ingest).ingest(&ingest.input_dir)?;
        if let Some(path) = &ingest.unified_output {
            write_table_to_path(&ingested.table, path)?;
        }

        let (cleaned, cleaning) =
            Cleaner::from_config(&self.config.cleaning).clean(&ingested.table)?;
        let table = Augmenter::new().augment(&cleaned)?;
        if let Some(path) = &ingest.consolidated_output {
            write_table_to_path(&table, path)?;
        }

        let aggregates = Aggregates::compute(&table);
        let co_occurrence = CoOccurrence::compute(&table, self.config.analysis.keep_self_pairs);
        let report = SalesReport::build(&cleaning, &aggregates, &co_occurrence, &self.config);

        info!(
            files = ingested.files.len(),
            rows = table.len(),
            multi_line_orders = co_occurrence.groups.len(),
            "pipeline complete"
        );

        Ok(PipelineOutput {
            ingested,
            cleaning,
            table,
            aggregates,
            co_occurrence,
            report,
        })
    }
}
