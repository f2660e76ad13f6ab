//! Dataset acquisition from CSV files or a remote spreadsheet export.

use csv::{ByteRecord, ReaderBuilder, Trim};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::classifier::StatusClassifier;
use crate::error::{ReportError, Result};
use crate::models::{
    CsvRecord, OrderRecord, FIELD_BASE, FIELD_CITY, FIELD_COURIER, FIELD_ORDER, FIELD_RECEIPT,
};

/// Where the order sheet comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    File(PathBuf),
    Url(String),
}

impl DataSource {
    pub fn describe(&self) -> String {
        match self {
            DataSource::File(path) => path.display().to_string(),
            DataSource::Url(url) => url.clone(),
        }
    }

    pub async fn load(&self, classifier: &StatusClassifier, timeout: Duration) -> Result<Dataset> {
        match self {
            DataSource::File(path) => load_path(path, classifier),
            DataSource::Url(url) => fetch_url(url, classifier, timeout).await,
        }
    }
}

/// Classified records plus bookkeeping about rows that could not be read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    pub records: Vec<OrderRecord>,
    pub skipped_rows: usize,
}

pub fn load_path(path: &Path, classifier: &StatusClassifier) -> Result<Dataset> {
    info!("Reading CSV from {:?}", path);
    let file = std::fs::File::open(path)
        .map_err(|e| ReportError::Acquisition(format!("{}: {}", path.display(), e)))?;
    read_records(file, classifier)
}

pub async fn fetch_url(url: &str, classifier: &StatusClassifier, timeout: Duration) -> Result<Dataset> {
    info!("Fetching order sheet from {}", url);
    let client = reqwest::Client::builder().timeout(timeout).build()?;
    let body = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .bytes()
        .await?;
    debug!("Downloaded {} bytes", body.len());
    read_records(&body[..], classifier)
}

/// Parses CSV with a header row. Fields are decoded lossily, so a cell with
/// bad bytes still yields an order (its receipt then falls through to not
/// delivered). Rows without an order id or base are skipped and counted;
/// a missing required column fails the whole read.
pub fn read_records<R: Read>(reader: R, classifier: &StatusClassifier) -> Result<Dataset> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).into_owned())
        .collect();
    let columns = Columns::locate(&headers)?;

    let mut dataset = Dataset::default();
    for (i, row) in reader.byte_records().enumerate() {
        let raw = match row {
            Ok(row) => columns.extract(&row),
            Err(e) => {
                if dataset.skipped_rows < 5 {
                    warn!("Failed to read row {}: {}", i + 1, e);
                }
                dataset.skipped_rows += 1;
                continue;
            }
        };

        match raw {
            Some(raw) => dataset.records.push(raw.to_order(classifier)),
            None => {
                if dataset.skipped_rows < 5 {
                    warn!("Row {} has no order id or base", i + 1);
                }
                dataset.skipped_rows += 1;
            }
        }
    }

    info!(
        "Parsed {} orders ({} rows skipped)",
        dataset.records.len(),
        dataset.skipped_rows
    );
    Ok(dataset)
}

/// Positions of the required labels in the header row
struct Columns {
    order_id: usize,
    base: usize,
    city: usize,
    courier: usize,
    receipt: usize,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self> {
        let find = |field: &str| {
            headers
                .iter()
                .position(|h| h == field)
                .ok_or_else(|| ReportError::MissingField(field.to_string()))
        };
        Ok(Self {
            order_id: find(FIELD_ORDER)?,
            base: find(FIELD_BASE)?,
            city: find(FIELD_CITY)?,
            courier: find(FIELD_COURIER)?,
            receipt: find(FIELD_RECEIPT)?,
        })
    }

    /// Empty or missing cells become `None`.
    fn extract(&self, row: &ByteRecord) -> Option<CsvRecord> {
        let text = |i: usize| {
            row.get(i)
                .filter(|b| !b.is_empty())
                .map(|b| String::from_utf8_lossy(b).into_owned())
        };
        let present = |v: Option<String>| v.filter(|s| !s.trim().is_empty());

        Some(CsvRecord {
            order_id: present(text(self.order_id))?,
            base: present(text(self.base))?,
            city: text(self.city).unwrap_or_default(),
            courier: text(self.courier),
            receipt: text(self.receipt),
        })
    }
}
