use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::zenodo::error::ZenodoError;

/// A Zenodo deposition (one record version, possibly an unpublished draft)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deposition {
    pub id: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conceptdoi: Option<String>,
    #[serde(default)]
    pub submitted: bool,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default)]
    pub links: BTreeMap<String, Value>,
    #[serde(default)]
    pub files: Vec<DepositionFile>,
}

impl Deposition {
    /// Look up a named link, failing with `MissingLink` when absent
    pub fn link(&self, name: &'static str) -> Result<&str, ZenodoError> {
        self.links
            .get(name)
            .and_then(Value::as_str)
            .ok_or(ZenodoError::MissingLink {
                link: name,
                id: self.id,
            })
    }

    pub fn bucket_url(&self) -> Result<&str, ZenodoError> {
        self.link("bucket")
    }

    pub fn publish_url(&self) -> Result<&str, ZenodoError> {
        self.link("publish")
    }

    pub fn new_version_url(&self) -> Result<&str, ZenodoError> {
        self.link("newversion")
    }

    pub fn latest_draft_url(&self) -> Result<&str, ZenodoError> {
        self.link("latest_draft")
    }

    /// Every link rendered as text, in key order
    pub fn link_pairs(&self) -> Vec<(String, String)> {
        self.links
            .iter()
            .map(|(name, value)| {
                let text = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (name.clone(), text)
            })
            .collect()
    }
}

/// A file attached to a deposition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DepositionFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub filename: String,
    #[serde(default)]
    pub links: BTreeMap<String, Value>,
}

impl DepositionFile {
    /// URL that deletes this file from its draft
    pub fn self_url(&self) -> Option<&str> {
        self.links.get("self").and_then(Value::as_str)
    }
}

/// Deposit metadata.
///
/// The fields the uploader touches are typed; every other key from the
/// server or a `.zenodo.json` template is kept in `extra` and written back
/// unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upload_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_identifiers: Option<Vec<RelatedIdentifier>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An entry of `metadata.related_identifiers`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RelatedIdentifier {
    pub identifier: String,
    pub relation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RelatedIdentifier {
    /// Points a record at the release page it supplements
    pub fn supplement_to(url: &str) -> Self {
        Self {
            identifier: url.to_string(),
            relation: "isSupplementTo".to_string(),
            resource_type: Some("software".to_string()),
            scheme: Some("url".to_string()),
            extra: Map::new(),
        }
    }
}

/// Body of the full metadata replace call
#[derive(Debug, Serialize)]
pub struct MetadataEnvelope<'a> {
    pub metadata: &'a Metadata,
}
