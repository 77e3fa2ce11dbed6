use crate::config::ZenodoConfig;
use crate::zenodo::api::{DepositApi, Operation};
use crate::zenodo::error::ZenodoError;
use crate::zenodo::models::{Deposition, Metadata, MetadataEnvelope};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::time::Duration;
use tokio_util::io::ReaderStream;
use tracing::{debug, info};

/// Path of the deposition collection, relative to the API origin
pub const DEPOSITIONS_PATH: &str = "/api/deposit/depositions";

/// Real Zenodo REST implementation of the DepositApi trait
#[derive(Clone)]
pub struct ZenodoClient {
    client: reqwest::Client,
    origin: String,
    token: String,
}

impl ZenodoClient {
    /// Create a new client from configuration. The token must already be set.
    pub fn new(config: &ZenodoConfig) -> Result<Self, ZenodoError> {
        Self::with_builder(config, reqwest::Client::builder())
    }

    /// Like `new`, starting from a caller-prepared reqwest builder
    pub fn with_builder(
        config: &ZenodoConfig,
        builder: reqwest::ClientBuilder,
    ) -> Result<Self, ZenodoError> {
        let client = builder
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("zenodo-release/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let origin = config.api_origin();
        info!("Using Zenodo API at {}", origin);

        Ok(Self {
            client,
            origin,
            token: config.token.clone(),
        })
    }

    /// Links returned by the API are absolute; our own paths are not
    pub fn resolve_url(&self, url: &str) -> String {
        if url.starts_with("http") {
            url.to_string()
        } else {
            format!("{}{}", self.origin, url)
        }
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let url = self.resolve_url(url);
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .query(&[("access_token", self.token.as_str())])
            .header(ACCEPT, "application/json")
    }

    /// Pass the response through when its status is accepted, otherwise
    /// turn it into an `Api` error carrying the body text
    async fn ensure_status(
        operation: Operation,
        response: Response,
    ) -> Result<Response, ZenodoError> {
        let status = response.status().as_u16();
        if operation.accepts(status) {
            return Ok(response);
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {}>", e.without_url()));
        Err(ZenodoError::Api {
            operation,
            status,
            body,
        })
    }

    async fn parse_response<T: DeserializeOwned>(
        operation: Operation,
        response: Response,
    ) -> Result<T, ZenodoError> {
        let response = Self::ensure_status(operation, response).await?;
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }
}

#[async_trait]
impl DepositApi for ZenodoClient {
    async fn list_depositions(&self) -> Result<Vec<Deposition>, ZenodoError> {
        let response = self.request(Method::GET, DEPOSITIONS_PATH).send().await?;
        Self::parse_response(Operation::ListDepositions, response).await
    }

    async fn create_deposition(&self) -> Result<Deposition, ZenodoError> {
        let response = self
            .request(Method::POST, DEPOSITIONS_PATH)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        Self::parse_response(Operation::CreateDeposition, response).await
    }

    async fn new_version(&self, url: &str) -> Result<Deposition, ZenodoError> {
        let response = self.request(Method::POST, url).send().await?;
        Self::parse_response(Operation::NewVersion, response).await
    }

    async fn get_deposition(&self, url: &str) -> Result<Deposition, ZenodoError> {
        let response = self.request(Method::GET, url).send().await?;
        Self::parse_response(Operation::GetDeposition, response).await
    }

    async fn delete_file(&self, url: &str) -> Result<(), ZenodoError> {
        let response = self.request(Method::DELETE, url).send().await?;
        Self::ensure_status(Operation::DeleteFile, response).await?;
        Ok(())
    }

    async fn upload_file(&self, bucket_url: &str, path: &Path) -> Result<(), ZenodoError> {
        let file_error = |source| ZenodoError::File {
            path: path.to_path_buf(),
            source,
        };

        let file_name = path.file_name().and_then(|n| n.to_str()).ok_or_else(|| {
            file_error(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "path has no usable file name",
            ))
        })?;

        let file = tokio::fs::File::open(path).await.map_err(file_error)?;
        let length = file.metadata().await.map_err(file_error)?.len();
        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));

        let url = format!("{}/{}", bucket_url.trim_end_matches('/'), file_name);
        debug!("Streaming {} bytes from {}", length, path.display());

        let response = self
            .request(Method::PUT, &url)
            .header(CONTENT_TYPE, "application/octet-stream")
            .header(CONTENT_LENGTH, length)
            .body(body)
            .send()
            .await?;
        Self::ensure_status(Operation::UploadFile, response).await?;
        Ok(())
    }

    async fn update_metadata(
        &self,
        id: u64,
        metadata: &Metadata,
    ) -> Result<Deposition, ZenodoError> {
        let url = format!("{}/{}", DEPOSITIONS_PATH, id);
        let response = self
            .request(Method::PUT, &url)
            .json(&MetadataEnvelope { metadata })
            .send()
            .await?;
        Self::parse_response(Operation::UpdateMetadata, response).await
    }

    async fn publish(&self, url: &str) -> Result<Deposition, ZenodoError> {
        let response = self.request(Method::POST, url).send().await?;
        Self::parse_response(Operation::Publish, response).await
    }
}
