use chrono::Utc;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::outputs::{print_group, PipelineOutputs};
use crate::upload::error::UploadError;
use crate::zenodo::{DepositApi, Deposition, MetadataUpdate, ZenodoError};

/// Everything one `upload` invocation asks for
#[derive(Debug, Clone, Default)]
pub struct UploadRequest {
    /// Archive path or glob pattern
    pub archive: String,
    /// Concept DOI to add a version to; a new record is created when absent
    pub doi: Option<String>,
    pub metadata: MetadataUpdate,
}

/// Drives one release upload against a Zenodo deposition API
pub struct Uploader<A: DepositApi> {
    api: A,
    outputs: PipelineOutputs,
}

impl<A: DepositApi> Uploader<A> {
    pub fn new(api: A, outputs: PipelineOutputs) -> Self {
        Uploader { api, outputs }
    }

    /// Runs the whole upload: draft, files, metadata, publish
    pub async fn run(&self, request: &UploadRequest) -> Result<Deposition, UploadError> {
        let archives = resolve_archives(&request.archive)?;
        info!("Found {} file(s) matching {}", archives.len(), request.archive);

        let draft = match &request.doi {
            Some(doi) => {
                let mut draft = self.resolve_draft(doi).await?;
                self.clear_files(&mut draft).await;
                draft
            }
            None => {
                if request.metadata.template.is_none() {
                    return Err(UploadError::Config(
                        "You MUST provide a .zenodo.json template to create a new DOI.".to_string(),
                    ));
                }
                self.create_deposition().await?
            }
        };
        info!("Working on draft deposition {}", draft.id);

        for path in &archives {
            self.upload_file(&draft, path).await?;
        }

        let updated = self.update_metadata(&draft, &request.metadata).await?;
        self.publish(&updated).await
    }

    pub async fn list_depositions(&self) -> Result<Vec<Deposition>, ZenodoError> {
        self.api.list_depositions().await
    }

    /// First deposition whose concept DOI is `conceptdoi`, in API order
    pub async fn find_deposit(&self, conceptdoi: &str) -> Result<Option<Deposition>, ZenodoError> {
        let deposits = self.list_depositions().await?;

        for deposit in deposits {
            let Some(doi) = &deposit.doi else {
                continue;
            };
            debug!("looking at deposit {}", doi);
            if deposit.conceptdoi.as_deref() == Some(conceptdoi) {
                info!("Found deposit {}", conceptdoi);
                return Ok(Some(deposit));
            }
        }

        Ok(None)
    }

    /// Start a brand new (empty) record
    pub async fn create_deposition(&self) -> Result<Deposition, ZenodoError> {
        info!("Requesting a new deposition");
        self.api.create_deposition().await
    }

    /// Find the editable draft for the lineage `doi`.
    ///
    /// An unsubmitted deposit is already a draft; the listing entry is
    /// trusted as is and not refetched through its `latest_draft` link. A
    /// published one gets a new version, whose `latest_draft` is fetched.
    pub async fn resolve_draft(&self, doi: &str) -> Result<Deposition, ZenodoError> {
        let deposit = self
            .find_deposit(doi)
            .await?
            .ok_or_else(|| ZenodoError::DepositNotFound(doi.to_string()))?;

        if !deposit.submitted {
            info!("Deposit {} is an unpublished draft, continuing on it", deposit.id);
            return Ok(deposit);
        }

        info!("Creating a new version of deposit {}", deposit.id);
        let versioned = self.api.new_version(deposit.new_version_url()?).await?;
        let draft = self
            .api
            .get_deposition(versioned.latest_draft_url()?)
            .await?;

        debug!(
            "Draft {} carries {} file(s) from the previous version",
            draft.id,
            draft.files.len()
        );
        Ok(draft)
    }

    /// Delete every file attached to `draft`. Failures are logged and the
    /// file is left in place; returns how many files were removed.
    pub async fn clear_files(&self, draft: &mut Deposition) -> usize {
        let mut kept = Vec::new();
        let mut removed = 0;

        for file in std::mem::take(&mut draft.files) {
            let Some(url) = file.self_url() else {
                warn!("could not delete file {}: no self link", file.filename);
                kept.push(file);
                continue;
            };

            match self.api.delete_file(url).await {
                Ok(()) => {
                    debug!("Deleted file {}", file.filename);
                    removed += 1;
                }
                Err(e) => {
                    warn!("could not delete file {}: {}", file.filename, e);
                    kept.push(file);
                }
            }
        }

        draft.files = kept;
        removed
    }

    /// Stream one local file into the deposition's bucket
    pub async fn upload_file(&self, deposition: &Deposition, path: &Path) -> Result<(), ZenodoError> {
        info!("Uploading {} to deposition {}", path.display(), deposition.id);
        self.api.upload_file(deposition.bucket_url()?, path).await
    }

    /// Merge template and overrides into the deposition's metadata and
    /// replace it on the server
    pub async fn update_metadata(
        &self,
        deposition: &Deposition,
        update: &MetadataUpdate,
    ) -> Result<Deposition, UploadError> {
        let file_description = match &update.description_file {
            Some(path) if update.needs_description_file() => Some(
                tokio::fs::read_to_string(path)
                    .await
                    .map_err(|source| UploadError::Description {
                        path: path.clone(),
                        source,
                    })?,
            ),
            _ => None,
        };

        let mut metadata = deposition.metadata.clone();
        update.apply(&mut metadata, file_description, Utc::now().date_naive());

        info!(
            "Updating metadata of deposition {} to version {}",
            deposition.id, update.version
        );
        Ok(self.api.update_metadata(deposition.id, &metadata).await?)
    }

    /// Publish the deposition and export its links as pipeline outputs
    pub async fn publish(&self, deposition: &Deposition) -> Result<Deposition, UploadError> {
        let published = self.api.publish(deposition.publish_url()?).await?;

        match serde_json::to_string_pretty(&published) {
            Ok(record) => print_group("Record", &record),
            Err(e) => warn!("could not render published record: {}", e),
        }

        if self.outputs.is_empty() {
            debug!("No pipeline output files configured, links are not exported");
        }
        for (name, value) in published.link_pairs() {
            self.outputs.set(&name, &value)?;
        }

        info!(
            "Published deposition {} ({})",
            published.id,
            published.doi.as_deref().unwrap_or("no doi")
        );
        Ok(published)
    }
}

/// Expand the archive argument into the files to upload
pub fn resolve_archives(pattern: &str) -> Result<Vec<PathBuf>, UploadError> {
    let entries = glob::glob(pattern)
        .map_err(|e| UploadError::Config(format!("Invalid archive pattern {}: {}", pattern, e)))?;

    let mut archives = Vec::new();
    for entry in entries {
        let path = entry.map_err(|e| UploadError::Config(format!("Cannot read archive: {}", e)))?;
        if path.is_file() {
            archives.push(path);
        } else {
            warn!("Skipping {}: not a regular file", path.display());
        }
    }

    if archives.is_empty() {
        return Err(UploadError::Config(format!(
            "Archive {} does not exist.",
            pattern
        )));
    }
    Ok(archives)
}
