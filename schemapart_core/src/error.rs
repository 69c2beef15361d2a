use std::io;

use crate::format::Format;

/// Failures of a single compression step.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Bad header or checksum, truncated stream, or corrupt body.
    #[error("{format} decode: {source}")]
    Decode { format: Format, source: io::Error },

    /// The compression backend failed while writing or finishing the stream.
    #[error("{format} encode: {source}")]
    Encode { format: Format, source: io::Error },

    #[error("{format} does not support compression level {level}")]
    InvalidLevel { format: Format, level: i32 },

    #[error("unknown format '{0}'. Valid options: gzip, zlib, deflate, zstd")]
    UnknownFormat(String),

    #[error("{format} cannot be used as a {role} format")]
    WrongRole { format: Format, role: &'static str },
}

/// Failures of the mapblock layout migration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("mapblock buffer not aligned: {len} bytes is not a multiple of 4")]
    NotAligned { len: usize },

    #[error("node id {id} at index {index} overflows 16 bits after the +32768 shift")]
    Range { index: usize, id: u16 },
}

/// Failure reported by a row store.
#[derive(Debug, thiserror::Error)]
#[error("store {op}: {detail}")]
pub struct StoreError {
    pub op: &'static str,
    pub detail: String,
}

impl StoreError {
    pub fn new(op: &'static str, detail: impl ToString) -> Self {
        Self {
            op,
            detail: detail.to_string(),
        }
    }
}

/// Which blob of a record an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Content,
    Metadata,
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Content => f.write_str("content"),
            Field::Metadata => f.write_str("metadata"),
        }
    }
}

/// Every way a migration run can fail. All of them end the run.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    #[error("record {id} {field}: {source}")]
    Codec {
        id: i64,
        field: Field,
        source: CodecError,
    },

    #[error("record {id} content: {source}")]
    Layout { id: i64, source: LayoutError },

    #[error("record {id} {field}: re-decoded output does not match (xxh3 {expected:016x} != {actual:016x})")]
    Verify {
        id: i64,
        field: Field,
        expected: u64,
        actual: u64,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}
