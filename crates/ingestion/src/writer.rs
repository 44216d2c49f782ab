//! CSV output for unified and consolidated tables.

use sales_core::{Result, TabularRow};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::info;

fn csv_error(e: csv::Error) -> sales_core::Error {
    sales_core::Error::Io(std::io::Error::other(e))
}

/// Write rows as CSV, header first.
pub fn write_table<T: TabularRow, W: Write>(rows: &[T], writer: W) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(T::headers()).map_err(csv_error)?;
    for row in rows {
        writer.write_record(row.record()).map_err(csv_error)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write rows as CSV to `path`, replacing any existing file.
pub fn write_table_to_path<T: TabularRow>(rows: &[T], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_table(rows, BufWriter::new(file))?;
    info!(path = %path.display(), rows = rows.len(), "wrote table");
    Ok(())
}
