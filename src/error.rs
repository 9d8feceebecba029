//! Unified error type for table and registry operations.

use thiserror::Error;

/// Every failure a table or registry operation can report.
///
/// Absence is not an error: `Table::get` returns `Ok(None)` and
/// `Table::erase` returns `Ok(false)` for keys that are simply not
/// present. The variants here cover contract violations only.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapError {
    #[error("cell size must be greater than zero")]
    InvalidCellSize,

    #[error("capacity must be greater than zero")]
    InvalidCapacity,

    #[error("empty key is reserved for vacant slots")]
    EmptyKey,

    #[error("key of {len} bytes exceeds the {max}-byte limit", max = crate::table::KEY_MAX)]
    KeyTooLong { len: usize },

    #[error("value of {got} bytes does not match the table's cell size of {expected}")]
    ValueSizeMismatch { expected: usize, got: usize },

    #[error("key is already registered")]
    DuplicateKey,

    #[error("no vacant slot left in the table")]
    TableFull,

    #[error("table handle is stale, foreign, or was never issued")]
    StaleHandle,
}
