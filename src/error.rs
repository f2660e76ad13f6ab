use thiserror::Error;

pub type Result<T> = std::result::Result<T, ReportError>;

/// Failures the reporting pipeline can surface.
///
/// Classification and aggregation are total; only acquisition, schema checks
/// and configuration can fail.
#[derive(Debug, Error)]
pub enum ReportError {
    /// The data source could not be read or parsed.
    #[error("no data available: {0}")]
    Acquisition(String),

    /// A required column label is absent from the dataset header.
    #[error("missing required field '{0}'")]
    MissingField(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("export failed: {0}")]
    Export(String),
}

impl From<csv::Error> for ReportError {
    fn from(e: csv::Error) -> Self {
        ReportError::Acquisition(e.to_string())
    }
}

impl From<std::io::Error> for ReportError {
    fn from(e: std::io::Error) -> Self {
        ReportError::Acquisition(e.to_string())
    }
}

impl From<reqwest::Error> for ReportError {
    fn from(e: reqwest::Error) -> Self {
        ReportError::Acquisition(e.to_string())
    }
}
