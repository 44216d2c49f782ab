//! Source file discovery and CSV reading.
//!
//! Reads every source file in a directory and concatenates the rows into one
//! unified table, in lexical file-name order.

use csv::{ReaderBuilder, StringRecord};
use sales_core::{
    config::IngestConfig, Error, RawOrderLine, RawTable, Result, ORDER_DATE, ORDER_ID,
    PRICE_EACH, PRODUCT, PURCHASE_ADDRESS, QUANTITY_ORDERED,
};
use serde::Serialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One source file that contributed to the unified table.
#[derive(Debug, Clone, Serialize)]
pub struct SourceFile {
    /// Path of the file.
    pub path: PathBuf,
    /// Number of data rows read from it.
    pub rows: usize,
}

/// Output of an ingestion run.
#[derive(Debug, Clone)]
pub struct Ingested {
    /// All rows of all files, in discovery order.
    pub table: RawTable,
    /// Files in the order they were read.
    pub files: Vec<SourceFile>,
}

/// Positions of the source columns within a file's header row.
#[derive(Debug, Clone, Copy)]
struct ColumnIndex {
    order_id: usize,
    product: usize,
    quantity_ordered: usize,
    price_each: usize,
    order_date: usize,
    purchase_address: usize,
}

impl ColumnIndex {
    fn from_headers(headers: &StringRecord, source: &str) -> Result<Self> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim() == name)
                .ok_or_else(|| Error::format(format!("{source}: missing '{name}' column")))
        };

        Ok(Self {
            order_id: find(ORDER_ID)?,
            product: find(PRODUCT)?,
            quantity_ordered: find(QUANTITY_ORDERED)?,
            price_each: find(PRICE_EACH)?,
            order_date: find(ORDER_DATE)?,
            purchase_address: find(PURCHASE_ADDRESS)?,
        })
    }

    fn extract(&self, record: &StringRecord) -> RawOrderLine {
        let get = |i: usize| record.get(i).unwrap_or_default().to_string();
        RawOrderLine {
            order_id: get(self.order_id),
            product: get(self.product),
            quantity_ordered: get(self.quantity_ordered),
            price_each: get(self.price_each),
            order_date: get(self.order_date),
            purchase_address: get(self.purchase_address),
        }
    }
}

/// Read one CSV source into raw order lines.
///
/// `source` only labels error messages.
pub fn read_table<R: Read>(reader: R, source: &str) -> Result<RawTable> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| Error::format(format!("{source}: failed to read headers: {e}")))?
        .clone();
    let columns = ColumnIndex::from_headers(&headers, source)?;

    let mut table = Vec::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| Error::format(format!("{source}: failed to read record: {e}")))?;
        table.push(columns.extract(&record));
    }

    Ok(table)
}

/// Reads a directory of monthly source files into one table.
pub struct Ingestor {
    /// Extension of source files, without the dot.
    file_extension: String,
}

impl Ingestor {
    /// Create a new ingestor for files with the given extension.
    pub fn new(file_extension: impl Into<String>) -> Self {
        Self {
            file_extension: file_extension.into(),
        }
    }

    /// Create an ingestor from configuration.
    pub fn from_config(config: &IngestConfig) -> Self {
        Self::new(config.file_extension.clone())
    }

    fn is_source_file(&self, path: &Path) -> bool {
        path.is_file()
            && path
                .extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(&self.file_extension))
    }

    /// List source files in `dir`, sorted by file name.
    pub fn discover(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(Error::not_found(format!(
                "input directory '{}' does not exist",
                dir.display()
            )));
        }

        let mut files = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let path = entry?.path();
            if self.is_source_file(&path) {
                files.push(path);
            }
        }
        files.sort();

        if files.is_empty() {
            return Err(Error::not_found(format!(
                "no .{} files in '{}'",
                self.file_extension,
                dir.display()
            )));
        }

        Ok(files)
    }

    /// Read a single source file.
    pub fn read_file(&self, path: &Path) -> Result<RawTable> {
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => {
                Error::not_found(format!("source file '{}' does not exist", path.display()))
            }
            _ => Error::Io(e),
        })?;
        read_table(file, &path.display().to_string())
    }

    /// Read every source file in `dir` and concatenate them.
    pub fn ingest(&self, dir: &Path) -> Result<Ingested> {
        let paths = self.discover(dir)?;
        let mut table = Vec::new();
        let mut files = Vec::with_capacity(paths.len());

        for path in paths {
            let rows = self.read_file(&path)?;
            debug!(file = %path.display(), rows = rows.len(), "read source file");
            files.push(SourceFile {
                path,
                rows: rows.len(),
            });
            table.extend(rows);
        }

        info!(files = files.len(), rows = table.len(), "ingested unified table");
        Ok(Ingested { table, files })
    }
}

impl Default for Ingestor {
    fn default() -> Self {
        Self::from_config(&IngestConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const HEADER: &str = "Order ID,Product,Quantity Ordered,Price Each,Order Date,Purchase Address\n";

    fn write_file(dir: &Path, name: &str, body: &str) {
        fs::write(dir.join(name), format!("{HEADER}{body}")).unwrap();
    }

    #[test]
    fn test_read_table() {
        let csv = format!(
            "{HEADER}176558,USB-C Charging Cable,2,11.95,04/19/19 08:46,\"917 1st St, Dallas, TX 75001\"\n"
        );
        let table = read_table(csv.as_bytes(), "inline").unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table[0].order_id, "176558");
        assert_eq!(table[0].quantity_ordered, "2");
        assert_eq!(table[0].purchase_address, "917 1st St, Dallas, TX 75001");
    }

    #[test]
    fn test_columns_found_by_name() {
        let csv = "Product,Order ID,Purchase Address,Order Date,Price Each,Quantity Ordered\n\
                   Wired Headphones,176560,\"669 Spruce St, Los Angeles, CA 90001\",04/12/19 14:38,11.99,1\n";
        let table = read_table(csv.as_bytes(), "inline").unwrap();

        assert_eq!(table[0].order_id, "176560");
        assert_eq!(table[0].product, "Wired Headphones");
        assert_eq!(table[0].price_each, "11.99");
    }

    #[test]
    fn test_empty_row_is_kept() {
        let csv = format!("{HEADER},,,,,\n");
        let table = read_table(csv.as_bytes(), "inline").unwrap();

        assert_eq!(table.len(), 1);
        assert!(table[0].is_empty());
    }

    #[test]
    fn test_missing_column_is_format_error() {
        let csv = "Order ID,Product\n1,Thing\n";
        let result = read_table(csv.as_bytes(), "inline");
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_ragged_row_is_format_error() {
        let csv = format!("{HEADER}1,Thing,1\n");
        let result = read_table(csv.as_bytes(), "inline");
        assert!(matches!(result, Err(Error::Format(_))));
    }

    #[test]
    fn test_missing_directory() {
        let ingestor = Ingestor::default();
        let result = ingestor.ingest(Path::new("/no/such/sales/dir"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_directory_without_sources() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("notes.txt"), "hello").unwrap();

        let result = Ingestor::default().ingest(dir.path());
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_ingest_concatenates_in_name_order() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "Sales_February_2019.csv",
            "200,Wired Headphones,1,11.99,02/01/19 10:00,\"1 A St, Boston, MA 02215\"\n",
        );
        write_file(
            dir.path(),
            "Sales_April_2019.csv",
            "100,AA Batteries (4-pack),1,3.84,04/01/19 10:00,\"1 A St, Boston, MA 02215\"\n\
             101,AA Batteries (4-pack),2,3.84,04/02/19 10:00,\"1 A St, Boston, MA 02215\"\n",
        );
        fs::write(dir.path().join("README.md"), "ignored").unwrap();

        let ingested = Ingestor::default().ingest(dir.path()).unwrap();

        assert_eq!(ingested.files.len(), 2);
        assert!(ingested.files[0].path.ends_with("Sales_April_2019.csv"));
        assert_eq!(ingested.files[0].rows, 2);
        let ids: Vec<&str> = ingested.table.iter().map(|r| r.order_id.as_str()).collect();
        assert_eq!(ids, vec!["100", "101", "200"]);
    }

    #[test]
    fn test_unparseable_file_fails_run() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "a.csv",
            "1,Thing,1,1.0,04/01/19 10:00,\"1 A St, Boston, MA 02215\"\n",
        );
        fs::write(dir.path().join("b.csv"), "just,some\nother,data\n").unwrap();

        let result = Ingestor::default().ingest(dir.path());
        assert!(matches!(result, Err(Error::Format(_))));
    }
}
