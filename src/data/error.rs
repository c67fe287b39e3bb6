use thiserror::Error;

/// Errors raised while loading or querying the catalogs.
#[derive(Error, Debug)]
pub enum CatalogError {
    /// Required columns are absent, or a key that must be unique repeats.
    #[error("schema error in {source_name}: {message}")]
    Schema { source_name: String, message: String },

    /// A field could not be parsed into its declared type.
    #[error("malformed row {row}, column '{column}': {message} (value '{value}')")]
    MalformedRow {
        row: usize,
        column: String,
        value: String,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),
}

pub type Result<T> = std::result::Result<T, CatalogError>;

impl CatalogError {
    pub fn schema(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        CatalogError::Schema {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn malformed(
        row: usize,
        column: impl Into<String>,
        value: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        CatalogError::MalformedRow {
            row,
            column: column.into(),
            value: value.into(),
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CatalogError::NotFound(message.into())
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        CatalogError::InvalidArgument(message.into())
    }

    /// Whether this is a lookup miss rather than a load or argument failure.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CatalogError::NotFound(_))
    }
}
