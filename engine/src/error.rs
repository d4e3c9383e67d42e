use thiserror::Error;

pub type Result<T> = std::result::Result<T, CatalogError>;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Missing catalog column: {0}")]
    MissingColumn(String),

    #[error("Invalid number in row {row}, column {column}: {value:?}")]
    InvalidNumber { row: usize, column: String, value: String },

    #[error("Unsupported catalog format: {0}")]
    UnsupportedFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error on line {line}: {source}")]
    Json { line: usize, source: serde_json::Error },
}
