use std::path::PathBuf;
use thiserror::Error;

use crate::zenodo::api::Operation;

/// Errors related to Zenodo deposition API operations
#[derive(Error, Debug)]
pub enum ZenodoError {
    /// The HTTP request itself failed (network, DNS, TLS, timeout).
    /// Holds the error with its URL removed, see the `From` impl.
    #[error("HTTP request failed: {0}")]
    Request(reqwest::Error),

    /// Zenodo answered with a status the operation does not accept
    #[error("{operation} failed with status {status}: {body}")]
    Api {
        operation: Operation,
        status: u16,
        body: String,
    },

    /// No deposition carries the requested concept DOI
    #[error("Cannot find deposit with doi: '{0}'. Are you currently editing it?")]
    DepositNotFound(String),

    /// A link the workflow relies on is absent from a deposition
    #[error("Deposition {id} has no '{link}' link")]
    MissingLink { link: &'static str, id: u64 },

    /// A local file could not be read for upload
    #[error("Failed to read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The response body was not the JSON we expected
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Request URLs carry the access token in their query string
impl From<reqwest::Error> for ZenodoError {
    fn from(err: reqwest::Error) -> Self {
        ZenodoError::Request(err.without_url())
    }
}

impl ZenodoError {
    /// HTTP status of an API error, if this is one
    pub fn status(&self) -> Option<u16> {
        match self {
            ZenodoError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
