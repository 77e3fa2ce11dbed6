use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;
use crate::outputs::OutputError;
use crate::zenodo::{TemplateError, ZenodoError};

/// Errors that abort an upload run
#[derive(Error, Debug)]
pub enum UploadError {
    /// Bad or missing input detected before (or instead of) talking to Zenodo
    #[error("{0}")]
    Config(String),

    #[error(transparent)]
    Settings(#[from] ConfigError),

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Failed to read description file {path}: {source}")]
    Description {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Zenodo(#[from] ZenodoError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

impl UploadError {
    /// Process exit code for this error: 2 for bad input, 1 for failed calls
    pub fn exit_code(&self) -> i32 {
        match self {
            UploadError::Config(_)
            | UploadError::Settings(_)
            | UploadError::Template(_)
            | UploadError::Description { .. } => 2,
            UploadError::Zenodo(_) | UploadError::Output(_) => 1,
        }
    }
}
