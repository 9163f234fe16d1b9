use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Failed to parse CSV upload '{filename}': {source}")]
    Parse {
        filename: String,
        #[source]
        source: csv::Error,
    },

    #[error("{report} report requires column '{column}', which is not present")]
    MissingColumn { report: &'static str, column: String },

    #[error("Could not parse date '{value}' on row {row}")]
    DateParse { row: usize, value: String },

    #[error("Date column is not normalized: row {row} holds '{value}'")]
    DateNotNormalized { row: usize, value: String },

    #[error("Invalid amount '{value}' on row {row}")]
    InvalidAmount { row: usize, value: String },

    #[error("Unknown view: {0}")]
    UnknownView(String),

    #[error("No upload history entry at index {0}")]
    HistoryEntryNotFound(usize),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ReportError>;
