use crate::outputs::PipelineOutputs;
use crate::zenodo::fake::FakeZenodo;
use crate::zenodo::{Deposition, Metadata};
use std::path::{Path, PathBuf};

/// Concept DOI used by seeded depositions
pub const CONCEPT_DOI: &str = "10.5281/zenodo.100";

/// Write a small archive into `dir` and return its path
pub fn create_test_archive(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

/// Write a `.zenodo.json` template into `dir` and return its path
pub fn create_test_template(dir: &Path, json: &str) -> PathBuf {
    let path = dir.join(".zenodo.json");
    std::fs::write(&path, json).unwrap();
    path
}

/// Parse a metadata literal, panicking on bad test input
pub fn metadata_from_json(json: &str) -> Metadata {
    serde_json::from_str(json).unwrap()
}

/// Seed `fake` with a deposition of lineage `CONCEPT_DOI`
///
/// # Arguments
///
/// * `id` - The deposition id
/// * `submitted` - Whether the deposition is already published
/// * `files` - Filenames attached to it
pub fn seed_deposition(fake: &FakeZenodo, id: u64, submitted: bool, files: &[&str]) -> Deposition {
    let mut deposition = FakeZenodo::deposition(id, CONCEPT_DOI, submitted);
    deposition.metadata = metadata_from_json(
        r#"{"title": "Previous release", "version": "1.0.0", "upload_type": "software",
            "creators": [{"name": "Doe, Jane"}]}"#,
    );
    fake.fake_add_deposition(deposition.clone());
    for file in files {
        fake.fake_add_file(id, file);
    }
    fake.fake_deposition(id).unwrap()
}

/// Pipeline outputs that only write to `dir/output`
pub fn test_outputs(dir: &Path) -> (PipelineOutputs, PathBuf) {
    let path = dir.join("output");
    (PipelineOutputs::with_files(None, Some(path.clone())), path)
}
