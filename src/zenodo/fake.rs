use crate::zenodo::api::{DepositApi, Operation};
use crate::zenodo::error::ZenodoError;
use crate::zenodo::models::{Deposition, DepositionFile, Metadata};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};

const FAKE_ORIGIN: &str = "https://fake.zenodo";

/// A request the fake has served
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiCall {
    pub operation: Operation,
    /// URL, bucket/file name or deposition id the call addressed
    pub target: String,
}

#[derive(Default)]
struct FakeState {
    depositions: Vec<Deposition>,
    contents: HashMap<(u64, String), Vec<u8>>,
    calls: Vec<ApiCall>,
    statuses: HashMap<Operation, u16>,
    next_id: u64,
}

/// `FakeZenodo` is an in-memory implementation of the `DepositApi` trait for testing purposes.
/// It keeps depositions and uploaded bytes in memory, records every call, and can answer
/// any operation with a chosen HTTP status.
#[derive(Clone)]
pub struct FakeZenodo {
    state: Arc<Mutex<FakeState>>,
}

impl FakeZenodo {
    /// Create a new FakeZenodo with no depositions
    pub fn new() -> Self {
        FakeZenodo {
            state: Arc::new(Mutex::new(FakeState {
                next_id: 1000,
                ..Default::default()
            })),
        }
    }

    /// Build a deposition with the links a real server would hand out
    pub fn deposition(id: u64, conceptdoi: &str, submitted: bool) -> Deposition {
        let base = format!("{}/api/deposit/depositions/{}", FAKE_ORIGIN, id);
        let mut links = BTreeMap::new();
        links.insert("self".to_string(), Value::String(base.clone()));
        links.insert(
            "bucket".to_string(),
            Value::String(format!("{}/api/files/bucket-{}", FAKE_ORIGIN, id)),
        );
        links.insert(
            "publish".to_string(),
            Value::String(format!("{}/actions/publish", base)),
        );
        links.insert(
            "newversion".to_string(),
            Value::String(format!("{}/actions/newversion", base)),
        );
        links.insert(
            "html".to_string(),
            Value::String(format!("{}/deposit/{}", FAKE_ORIGIN, id)),
        );

        Deposition {
            id,
            doi: Some(format!("10.5281/zenodo.{}", id)),
            conceptdoi: Some(conceptdoi.to_string()),
            submitted,
            links,
            ..Default::default()
        }
    }

    /// Seed a deposition, as if it already existed on the server
    pub fn fake_add_deposition(&self, deposition: Deposition) {
        let mut state = self.state.lock().unwrap();
        state.next_id = state.next_id.max(deposition.id + 1);
        state.depositions.push(deposition);
    }

    /// Attach a file to a seeded deposition
    pub fn fake_add_file(&self, id: u64, filename: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(deposition) = state.depositions.iter_mut().find(|d| d.id == id) {
            deposition.files.push(file_entry(id, filename));
        }
    }

    /// Answer every following call of `operation` with `status`.
    /// Accepted statuses behave normally; anything else is an API error.
    pub fn fake_respond(&self, operation: Operation, status: u16) {
        let mut state = self.state.lock().unwrap();
        state.statuses.insert(operation, status);
    }

    pub fn fake_calls(&self) -> Vec<ApiCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn fake_count(&self, operation: Operation) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|c| c.operation == operation)
            .count()
    }

    pub fn fake_deposition(&self, id: u64) -> Option<Deposition> {
        let state = self.state.lock().unwrap();
        state.depositions.iter().find(|d| d.id == id).cloned()
    }

    /// Bytes uploaded under `filename` into deposition `id`
    pub fn fake_content(&self, id: u64, filename: &str) -> Option<Vec<u8>> {
        let state = self.state.lock().unwrap();
        state.contents.get(&(id, filename.to_string())).cloned()
    }
}

/// Record the call and fail it if a non-accepted status was configured
fn begin(state: &mut FakeState, operation: Operation, target: &str) -> Result<(), ZenodoError> {
    state.calls.push(ApiCall {
        operation,
        target: target.to_string(),
    });
    match state.statuses.get(&operation) {
        Some(&status) if !operation.accepts(status) => Err(ZenodoError::Api {
            operation,
            status,
            body: format!(
                "{{\"status\": {}, \"message\": \"simulated failure\"}}",
                status
            ),
        }),
        _ => Ok(()),
    }
}

fn not_found(operation: Operation, target: &str) -> ZenodoError {
    ZenodoError::Api {
        operation,
        status: 404,
        body: format!("{{\"status\": 404, \"message\": \"{} not found\"}}", target),
    }
}

fn file_entry(id: u64, filename: &str) -> DepositionFile {
    let mut links = BTreeMap::new();
    links.insert(
        "self".to_string(),
        Value::String(format!(
            "{}/api/deposit/depositions/{}/files/{}",
            FAKE_ORIGIN, id, filename
        )),
    );
    DepositionFile {
        id: Some(format!("{}-{}", id, filename)),
        filename: filename.to_string(),
        links,
    }
}

fn find_by_link<'a>(
    depositions: &'a mut [Deposition],
    link: &str,
    url: &str,
) -> Option<&'a mut Deposition> {
    depositions
        .iter_mut()
        .find(|d| d.links.get(link).and_then(Value::as_str) == Some(url))
}

#[async_trait]
impl DepositApi for FakeZenodo {
    async fn list_depositions(&self) -> Result<Vec<Deposition>, ZenodoError> {
        let mut state = self.state.lock().unwrap();
        begin(&mut state, Operation::ListDepositions, "/api/deposit/depositions")?;
        Ok(state.depositions.clone())
    }

    async fn create_deposition(&self) -> Result<Deposition, ZenodoError> {
        let mut state = self.state.lock().unwrap();
        begin(&mut state, Operation::CreateDeposition, "/api/deposit/depositions")?;

        let id = state.next_id;
        state.next_id += 1;
        let mut deposition = FakeZenodo::deposition(id, "", false);
        deposition.doi = None;
        deposition.conceptdoi = None;
        deposition.links.remove("newversion");
        state.depositions.push(deposition.clone());
        Ok(deposition)
    }

    async fn new_version(&self, url: &str) -> Result<Deposition, ZenodoError> {
        let mut state = self.state.lock().unwrap();
        begin(&mut state, Operation::NewVersion, url)?;

        let draft_id = state.next_id;
        let source = find_by_link(&mut state.depositions, "newversion", url)
            .ok_or_else(|| not_found(Operation::NewVersion, url))?;

        let conceptdoi = source.conceptdoi.clone().unwrap_or_default();
        let mut draft = FakeZenodo::deposition(draft_id, &conceptdoi, false);
        draft.metadata = source.metadata.clone();
        draft.files = source
            .files
            .iter()
            .map(|f| file_entry(draft_id, &f.filename))
            .collect();

        let draft_url = draft.links["self"].clone();
        source
            .links
            .insert("latest_draft".to_string(), draft_url.clone());
        let response = source.clone();

        state.next_id += 1;
        draft.links.insert("latest_draft".to_string(), draft_url);
        state.depositions.push(draft);
        Ok(response)
    }

    async fn get_deposition(&self, url: &str) -> Result<Deposition, ZenodoError> {
        let mut state = self.state.lock().unwrap();
        begin(&mut state, Operation::GetDeposition, url)?;
        find_by_link(&mut state.depositions, "self", url)
            .map(|d| d.clone())
            .ok_or_else(|| not_found(Operation::GetDeposition, url))
    }

    async fn delete_file(&self, url: &str) -> Result<(), ZenodoError> {
        let mut state = self.state.lock().unwrap();
        begin(&mut state, Operation::DeleteFile, url)?;

        for deposition in state.depositions.iter_mut() {
            let before = deposition.files.len();
            deposition.files.retain(|f| f.self_url() != Some(url));
            if deposition.files.len() != before {
                return Ok(());
            }
        }
        Err(not_found(Operation::DeleteFile, url))
    }

    async fn upload_file(&self, bucket_url: &str, path: &Path) -> Result<(), ZenodoError> {
        let data = tokio::fs::read(path).await.map_err(|source| ZenodoError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let mut state = self.state.lock().unwrap();
        let target = format!("{}/{}", bucket_url, filename);
        begin(&mut state, Operation::UploadFile, &target)?;

        let deposition = find_by_link(&mut state.depositions, "bucket", bucket_url)
            .ok_or_else(|| not_found(Operation::UploadFile, bucket_url))?;
        let id = deposition.id;
        if !deposition.files.iter().any(|f| f.filename == filename) {
            deposition.files.push(file_entry(id, &filename));
        }
        state.contents.insert((id, filename), data);
        Ok(())
    }

    async fn update_metadata(
        &self,
        id: u64,
        metadata: &Metadata,
    ) -> Result<Deposition, ZenodoError> {
        let mut state = self.state.lock().unwrap();
        begin(&mut state, Operation::UpdateMetadata, &id.to_string())?;

        let deposition = state
            .depositions
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| not_found(Operation::UpdateMetadata, &id.to_string()))?;
        deposition.metadata = metadata.clone();
        Ok(deposition.clone())
    }

    async fn publish(&self, url: &str) -> Result<Deposition, ZenodoError> {
        let mut state = self.state.lock().unwrap();
        begin(&mut state, Operation::Publish, url)?;

        let deposition = find_by_link(&mut state.depositions, "publish", url)
            .ok_or_else(|| not_found(Operation::Publish, url))?;
        deposition.submitted = true;
        if deposition.doi.is_none() {
            deposition.doi = Some(format!("10.5281/zenodo.{}", deposition.id));
        }
        deposition.links.insert(
            "doi".to_string(),
            Value::String(format!(
                "https://doi.org/{}",
                deposition.doi.clone().unwrap_or_default()
            )),
        );
        Ok(deposition.clone())
    }
}

impl Default for FakeZenodo {
    fn default() -> Self {
        Self::new()
    }
}
