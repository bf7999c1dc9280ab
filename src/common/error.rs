use thiserror::Error;

use super::types::PageId;

/// Database error types
#[derive(Error, Debug)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Relation '{0}' not found")]
    RelationNotFound(String),

    #[error("Relation '{0}' already exists")]
    RelationExists(String),

    #[error("No index on column {column} of relation '{relation}'")]
    IndexNotFound { relation: String, column: usize },

    #[error("Column {column} out of range for a {count}-column relation")]
    ColumnOutOfRange { column: usize, count: usize },

    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Value for column {column} exceeds its declared width of {max} characters")]
    ValueTooLong { column: usize, max: usize },

    #[error("Unknown column type: {0}")]
    UnknownColumnType(String),

    #[error("Buffer pool exhausted: every frame is pinned")]
    PoolExhausted,

    #[error("Header page of file {0} has no room for another data page")]
    HeaderFull(u32),

    #[error("Page {0} is corrupt: header counter disagrees with its bytemap")]
    CorruptPage(PageId),
}

pub type Result<T> = std::result::Result<T, DbError>;
