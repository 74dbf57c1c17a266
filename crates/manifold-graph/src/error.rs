//! Error taxonomy for the graph storage engine.

use std::fmt;

use manifold::{StorageError, TableError, TransactionError};

/// Errors that can arise from any graph storage representation.
///
/// Mirrors the manual `Display`/`std::error::Error`/`From` impls used by
/// `ColumnFamilyError` in `manifold::column_family::database`, rather than
/// pulling in a separate error-derive crate.
#[derive(Debug)]
pub enum GraphError {
    /// A configuration option was missing, contradictory, or names an
    /// unknown representation.
    Configuration(String),
    /// A node or edge lookup found nothing at the given key.
    NotFound(String),
    /// An explicit add-when-absent contract was violated by an existing
    /// record.
    AlreadyExists(String),
    /// A cross-table invariant was found broken while serving a request
    /// (e.g. an adjacency entry with no matching node row). Fatal: the
    /// handle should stop serving requests once this is observed.
    InvariantViolation(String),
    /// `create_indices`/`drop_indices` was called while a cursor or
    /// transaction still references the affected table.
    ResourceBusy(String),
    /// An operation is not supported under the graph's current options,
    /// e.g. reading edge weight on an unweighted graph.
    Unsupported(String),
    /// Propagated failure from the underlying key-value store.
    Storage(StorageError),
}

impl fmt::Display for GraphError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration(msg) => write!(f, "configuration error: {msg}"),
            Self::NotFound(msg) => write!(f, "not found: {msg}"),
            Self::AlreadyExists(msg) => write!(f, "already exists: {msg}"),
            Self::InvariantViolation(msg) => write!(f, "invariant violation: {msg}"),
            Self::ResourceBusy(msg) => write!(f, "resource busy: {msg}"),
            Self::Unsupported(msg) => write!(f, "unsupported operation: {msg}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl std::error::Error for GraphError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StorageError> for GraphError {
    fn from(err: StorageError) -> Self {
        Self::Storage(err)
    }
}

impl From<TableError> for GraphError {
    fn from(err: TableError) -> Self {
        match err {
            TableError::Storage(storage) => Self::Storage(storage),
            other => Self::Storage(StorageError::Io(std::io::Error::other(other))),
        }
    }
}

impl From<TransactionError> for GraphError {
    fn from(err: TransactionError) -> Self {
        match err {
            TransactionError::Storage(storage) => Self::Storage(storage),
            other => Self::Storage(StorageError::Io(std::io::Error::other(other))),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type GraphResult<T> = Result<T, GraphError>;
