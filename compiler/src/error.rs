use brine_fidl_schema::SchemaError;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FidlgenError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Unknown identifier \"{0}\"")]
    UnknownIdentifier(String),

    #[error("Declaration \"{name}\" is listed as {listed} but indexed as {indexed}")]
    DeclTypeMismatch {
        name:    String,
        listed:  String,
        indexed: String,
    },

    #[error("Declaration \"{0}\" is defined twice")]
    DuplicateDeclaration(String),

    #[error("Bits declaration \"{0}\" must use a primitive type")]
    BitsNotPrimitive(String),

    #[error("Table \"{table}\" member @{ordinal} is not reserved but has no name or type")]
    IncompleteTableMember {
        table:   String,
        ordinal: u32,
    },

    #[error("Missing {form} form for type {decl}")]
    MissingPeerForm {
        decl: String,
        form: &'static str,
    },

    #[error("JSON IR contains invalid numeric literal: {0}")]
    InvalidNumericLiteral(String),

    #[error("Unable to start formatter {path}: {source}")]
    FormatterSpawn {
        path:   String,
        source: std::io::Error,
    },

    #[error("Formatter {path} failed with {status}: {stderr}")]
    FormatterFailed {
        path:   String,
        status: String,
        stderr: String,
    },

    #[error("Formatter {path} did not finish within {timeout:?}")]
    FormatterTimeout {
        path:    String,
        timeout: Duration,
    },
}

pub type Result<T, E = FidlgenError> = std::result::Result<T, E>;
