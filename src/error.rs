use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read dataset: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("dataset has no data rows once the footer row is dropped")]
    MissingRows,
    #[error("line {line}: column `{column}` holds non-numeric value `{value}`")]
    InvalidNumber {
        line: u64,
        column: &'static str,
        value: String,
    },
    #[error("line {line}: month `{month}` appears more than once")]
    DuplicateMonth { line: u64, month: String },
}

#[derive(Debug, Error)]
pub enum DashboardError {
    #[error("month `{0}` not found in dataset")]
    RowNotFound(String),
}

pub type DashboardResult<T> = Result<T, DashboardError>;
