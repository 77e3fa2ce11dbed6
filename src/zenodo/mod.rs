pub mod api;
pub mod client;
pub mod error;
#[cfg(test)]
pub mod fake;
pub mod metadata;
pub mod models;

pub use api::{DepositApi, Operation};
pub use client::ZenodoClient;
pub use error::ZenodoError;
pub use metadata::{MetadataUpdate, TemplateError};
pub use models::{Deposition, DepositionFile, Metadata, RelatedIdentifier};
