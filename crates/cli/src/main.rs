use anyhow::Context;
use clap::Parser;
use sales_analysis::Pipeline;
use sales_core::Config;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "sales-report", about = "Merge monthly sales files and answer business questions")]
struct Cli {
    /// Directory holding one sales CSV per month
    input_dir: PathBuf,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Write the cleaned, augmented table to this CSV file
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the unified (pre-cleaning) table to this CSV file
    #[arg(long)]
    unified: Option<PathBuf>,

    /// Number of product pairs to report
    #[arg(short = 'n', long)]
    top: Option<usize>,

    /// Print the report as JSON instead of text
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<(Config, bool)> {
        let mut config = match &self.config {
            Some(path) => Config::from_json_file(path)
                .with_context(|| format!("loading config from {}", path.display()))?,
            None => Config::default(),
        };
        let json = self.json;
        self.apply_overrides(&mut config);
        Ok((config, json))
    }

    /// Command-line values take precedence over the loaded configuration.
    fn apply_overrides(self, config: &mut Config) {
        config.ingest.input_dir = self.input_dir;
        if self.output.is_some() {
            config.ingest.consolidated_output = self.output;
        }
        if self.unified.is_some() {
            config.ingest.unified_output = self.unified;
        }
        if let Some(top) = self.top {
            config.analysis.top_pairs = top;
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let (config, json) = Cli::parse().into_config()?;
    let input_dir = config.ingest.input_dir.clone();

    let pipeline = Pipeline::new(config).context("invalid configuration")?;
    let output = pipeline
        .run()
        .with_context(|| format!("processing {}", input_dir.display()))?;

    if json {
        println!("{}", output.report.to_json()?);
    } else {
        print!("{}", output.report);
    }

    info!(
        rows = output.table.len(),
        dropped = output.cleaning.dropped(),
        "report complete"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn loaded_config() -> Config {
        let mut config = Config::default();
        config.ingest.input_dir = PathBuf::from("/from/config");
        config.ingest.unified_output = Some(PathBuf::from("config_unified.csv"));
        config.ingest.consolidated_output = Some(PathBuf::from("config_augmented.csv"));
        config.analysis.top_pairs = 7;
        config
    }

    #[test]
    fn test_flags_override_loaded_config() {
        let cli = Cli::try_parse_from([
            "sales-report",
            "./Sales_Data",
            "--output",
            "augmented.csv",
            "--unified",
            "unified.csv",
            "-n",
            "3",
        ])
        .unwrap();
        let mut config = loaded_config();
        cli.apply_overrides(&mut config);

        assert_eq!(config.ingest.input_dir, PathBuf::from("./Sales_Data"));
        assert_eq!(config.ingest.consolidated_output, Some(PathBuf::from("augmented.csv")));
        assert_eq!(config.ingest.unified_output, Some(PathBuf::from("unified.csv")));
        assert_eq!(config.analysis.top_pairs, 3);
    }

    #[test]
    fn test_absent_flags_keep_loaded_config() {
        let cli = Cli::try_parse_from(["sales-report", "./Sales_Data"]).unwrap();
        let mut config = loaded_config();
        cli.apply_overrides(&mut config);

        assert_eq!(config.ingest.input_dir, PathBuf::from("./Sales_Data"));
        assert_eq!(
            config.ingest.consolidated_output,
            Some(PathBuf::from("config_augmented.csv"))
        );
        assert_eq!(config.ingest.unified_output, Some(PathBuf::from("config_unified.csv")));
        assert_eq!(config.analysis.top_pairs, 7);
    }

    #[test]
    fn test_into_config_reads_file_then_applies_flags() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"analysis": {{"top_pairs": 4, "keep_self_pairs": false}}}}"#).unwrap();
        let path = file.path().to_str().unwrap().to_string();

        let cli = Cli::try_parse_from(["sales-report", "data", "-c", &path, "--json"]).unwrap();
        let (config, json) = cli.into_config().unwrap();

        assert!(json);
        assert_eq!(config.analysis.top_pairs, 4);
        assert!(!config.analysis.keep_self_pairs);
        assert_eq!(config.ingest.input_dir, PathBuf::from("data"));
    }

    #[test]
    fn test_missing_config_file_is_error() {
        let cli = Cli::try_parse_from(["sales-report", "data", "-c", "/no/such/config.json"]).unwrap();
        assert!(cli.into_config().is_err());
    }
}
