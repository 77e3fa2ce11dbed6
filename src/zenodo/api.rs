use crate::zenodo::error::ZenodoError;
use crate::zenodo::models::{Deposition, Metadata};
use async_trait::async_trait;
use std::fmt;
use std::path::Path;

/// One kind of Zenodo request, with the statuses it treats as success
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    ListDepositions,
    CreateDeposition,
    NewVersion,
    GetDeposition,
    DeleteFile,
    UploadFile,
    UpdateMetadata,
    Publish,
}

impl Operation {
    pub fn accepted(&self) -> &'static [u16] {
        match self {
            Operation::ListDepositions
            | Operation::CreateDeposition
            | Operation::NewVersion
            | Operation::GetDeposition
            | Operation::UploadFile => &[200, 201],
            Operation::DeleteFile => &[200, 204],
            Operation::UpdateMetadata => &[200],
            Operation::Publish => &[200, 201, 202],
        }
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.accepted().contains(&status)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::ListDepositions => "Query depositions",
            Operation::CreateDeposition => "Create deposition",
            Operation::NewVersion => "Create new version",
            Operation::GetDeposition => "Fetch draft",
            Operation::DeleteFile => "Delete file",
            Operation::UploadFile => "Upload file",
            Operation::UpdateMetadata => "Update metadata",
            Operation::Publish => "Publish record",
        };
        write!(f, "{}", label)
    }
}

/// The Zenodo deposition REST calls the uploader relies on.
///
/// Each method is one request/response pair. Implementations translate any
/// status outside the accepted set into `ZenodoError::Api`.
#[async_trait]
pub trait DepositApi: Send + Sync + 'static {
    /// `GET /api/deposit/depositions`, accepting 200 or 201
    async fn list_depositions(&self) -> Result<Vec<Deposition>, ZenodoError>;

    /// `POST /api/deposit/depositions` with an empty body, accepting 200 or 201
    async fn create_deposition(&self) -> Result<Deposition, ZenodoError>;

    /// POST to a deposition's `newversion` link, accepting 200 or 201
    ///
    /// * `url` - The `newversion` link of a published deposition
    async fn new_version(&self, url: &str) -> Result<Deposition, ZenodoError>;

    /// GET a deposition by link (typically `latest_draft`), accepting 200 or 201
    async fn get_deposition(&self, url: &str) -> Result<Deposition, ZenodoError>;

    /// DELETE a draft file by its `self` link, accepting 200 or 204
    async fn delete_file(&self, url: &str) -> Result<(), ZenodoError>;

    /// Stream a local file into a bucket under its basename, accepting 200 or 201
    ///
    /// * `bucket_url` - The deposition's `bucket` link
    /// * `path` - The local file to send
    async fn upload_file(&self, bucket_url: &str, path: &Path) -> Result<(), ZenodoError>;

    /// Replace a deposition's metadata, accepting 200 only
    async fn update_metadata(
        &self,
        id: u64,
        metadata: &Metadata,
    ) -> Result<Deposition, ZenodoError>;

    /// POST to a deposition's `publish` link, accepting 200, 201 or 202
    async fn publish(&self, url: &str) -> Result<Deposition, ZenodoError>;
}
