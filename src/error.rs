use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("schema error in {table}: {detail}")]
    Schema { table: String, detail: String },

    #[error("column '{logical}' not found. available columns: {available:?}")]
    ColumnNotFound {
        logical: String,
        available: Vec<String>,
    },

    #[error("invalid {column} value {value:?} in {table} (row {row})")]
    InvalidValue {
        table: String,
        row: usize,
        column: String,
        value: String,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("workbook error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl PipelineError {
    pub fn schema(table: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Schema {
            table: table.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
