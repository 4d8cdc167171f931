use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON IR: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid compound identifier \"{0}\"")]
    InvalidCompoundIdentifier(String),
}
