//! Failures of the CouchDB timer store.

use reqwest::{Method, StatusCode};
use thiserror::Error;

use crate::dao::storage::StorageError;

/// Result alias for CouchDB operations.
pub type CouchResult<T> = Result<T, CouchDaoError>;

/// What went wrong while talking to CouchDB. `target` names the database or
/// document path the request was aimed at.
#[derive(Debug, Error)]
pub enum CouchDaoError {
    /// A required `COUCH_*` variable is not set.
    #[error("missing CouchDB environment variable `{var}`")]
    MissingEnvVar { var: &'static str },
    /// The HTTP client could not be built.
    #[error("failed to build CouchDB client")]
    Client {
        #[source]
        source: reqwest::Error,
    },
    /// The request never got an answer.
    #[error("CouchDB {method} `{target}` failed")]
    Transport {
        method: Method,
        target: String,
        #[source]
        source: reqwest::Error,
    },
    /// CouchDB answered with an unexpected status.
    #[error("CouchDB {method} `{target}` answered {status}")]
    Status {
        method: Method,
        target: String,
        status: StatusCode,
    },
    /// The document revision moved between reading and writing it.
    #[error("CouchDB revision conflict on `{doc_id}`")]
    Conflict { doc_id: String },
    /// A response body could not be decoded.
    #[error("unreadable CouchDB response for `{target}`")]
    Decode {
        target: String,
        #[source]
        source: reqwest::Error,
    },
    /// A document ID does not encode a timer UUID.
    #[error("invalid timer document ID `{doc_id}`: {kind}")]
    InvalidDocId { doc_id: String, kind: &'static str },
}

impl From<CouchDaoError> for StorageError {
    fn from(err: CouchDaoError) -> Self {
        match err {
            CouchDaoError::InvalidDocId { doc_id, kind } => StorageError::corrupt(doc_id, kind),
            other => StorageError::unavailable(other.to_string(), other),
        }
    }
}
