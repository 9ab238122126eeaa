// catalog/error.rs - Store error taxonomy
//
// Only store failures leave the query layer as errors. Data-shape
// anomalies are absorbed by the builder and the normalizer.

use thiserror::Error;

use crate::catalog::config::ConfigError;

#[derive(Debug, Error)]
pub enum CatalogError {
    /// The store could not be reached
    #[error("Connection failed: {0}")]
    Connection(String),

    /// The store rejected or failed to run a query
    #[error("Query failed: {0}")]
    Query(String),

    /// The store implementation cannot run this kind of operation
    #[error("{store} does not support {operation}")]
    Unsupported {
        store: &'static str,
        operation: &'static str,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl CatalogError {
    /// True for failures caused by an unreachable store.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, CatalogError::Connection(_))
    }
}

#[cfg(feature = "db-tools")]
impl From<mongodb::error::Error> for CatalogError {
    fn from(err: mongodb::error::Error) -> Self {
        use mongodb::error::ErrorKind;

        match err.kind.as_ref() {
            ErrorKind::ServerSelection { .. }
            | ErrorKind::Io(_)
            | ErrorKind::DnsResolve { .. }
            | ErrorKind::ConnectionPoolCleared { .. }
            | ErrorKind::Authentication { .. } => CatalogError::Connection(err.to_string()),
            _ => CatalogError::Query(err.to_string()),
        }
    }
}
