use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::zenodo::models::{Metadata, RelatedIdentifier};

/// Upload type assumed when neither the record nor the template names one
pub const DEFAULT_UPLOAD_TYPE: &str = "software";

/// Errors reading a `.zenodo.json` template
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read metadata template {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Metadata template {path} is not a JSON object: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl Metadata {
    /// Load a `.zenodo.json` template from disk
    pub fn from_template(path: &Path) -> Result<Self, TemplateError> {
        let text = std::fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| TemplateError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Layer `overrides` on top of `self`. Keys present in `overrides`
    /// replace ours wholesale, lists included.
    pub fn merge(&mut self, overrides: Metadata) {
        let Metadata {
            title,
            description,
            version,
            publication_date,
            upload_type,
            related_identifiers,
            extra,
        } = overrides;

        if title.is_some() {
            self.title = title;
        }
        if description.is_some() {
            self.description = description;
        }
        if version.is_some() {
            self.version = version;
        }
        if publication_date.is_some() {
            self.publication_date = publication_date;
        }
        if upload_type.is_some() {
            self.upload_type = upload_type;
        }
        if related_identifiers.is_some() {
            self.related_identifiers = related_identifiers;
        }
        self.extra.extend(extra);
    }
}

/// Everything one invocation changes about a draft's metadata
#[derive(Debug, Clone, Default)]
pub struct MetadataUpdate {
    /// Parsed `.zenodo.json`, merged first
    pub template: Option<Metadata>,
    pub version: String,
    /// Release page recorded as an `isSupplementTo` related identifier
    pub html_url: Option<String>,
    pub title: Option<String>,
    /// Literal description; wins over `description_file`
    pub description: Option<String>,
    pub description_file: Option<PathBuf>,
}

impl MetadataUpdate {
    /// Whether the description file has to be read at all
    pub fn needs_description_file(&self) -> bool {
        self.description.is_none() && self.description_file.is_some()
    }

    /// Apply the update to `metadata` in place.
    ///
    /// Order matters: template, then version, publication date and the
    /// default upload type, then the release link, and finally the explicit
    /// title and description overrides.
    pub fn apply(
        &self,
        metadata: &mut Metadata,
        file_description: Option<String>,
        today: NaiveDate,
    ) {
        if let Some(template) = &self.template {
            metadata.merge(template.clone());
        }

        metadata.version = Some(self.version.clone());
        metadata.publication_date = Some(today.format("%Y-%m-%d").to_string());

        if metadata.upload_type.is_none() {
            metadata.upload_type = Some(DEFAULT_UPLOAD_TYPE.to_string());
        }

        if let Some(url) = &self.html_url {
            metadata
                .related_identifiers
                .get_or_insert_with(Vec::new)
                .push(RelatedIdentifier::supplement_to(url));
        }

        if let Some(title) = &self.title {
            metadata.title = Some(title.clone());
        }

        if let Some(description) = &self.description {
            metadata.description = Some(description.clone());
        } else if let Some(text) = file_description {
            metadata.description = Some(text);
        }
    }
}
