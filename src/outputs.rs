use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use thiserror::Error;
use tracing::info;

/// Variables naming the files a GitHub Actions step appends `KEY=VALUE` lines to
pub const OUTPUT_VARS: [&str; 2] = ["GITHUB_ENV", "GITHUB_OUTPUT"];

#[derive(Error, Debug)]
#[error("Failed to write {name} to {path}: {source}")]
pub struct OutputError {
    pub name: String,
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}

/// Named outputs handed to later pipeline steps
#[derive(Debug, Clone, Default)]
pub struct PipelineOutputs {
    targets: Vec<(&'static str, PathBuf)>,
}

impl PipelineOutputs {
    /// Collect every output file present in the environment; unset ones are skipped
    pub fn from_env() -> Self {
        let targets = OUTPUT_VARS
            .iter()
            .filter_map(|var| {
                std::env::var_os(var)
                    .filter(|path| !path.is_empty())
                    .map(|path| (*var, PathBuf::from(path)))
            })
            .collect();
        Self { targets }
    }

    /// Write to explicit files instead of the environment's
    pub fn with_files(env_file: Option<PathBuf>, output_file: Option<PathBuf>) -> Self {
        let targets = OUTPUT_VARS
            .iter()
            .zip([env_file, output_file])
            .filter_map(|(var, path)| path.map(|path| (*var, path)))
            .collect();
        Self { targets }
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Append `name=value` to each target file
    pub fn set(&self, name: &str, value: &str) -> Result<(), OutputError> {
        for (var, path) in &self.targets {
            info!("Writing {}={} to {}", name, value, var);

            let to_error = |source| OutputError {
                name: name.to_string(),
                path: path.clone(),
                source,
            };
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(to_error)?;
            writeln!(file, "{}={}", name, value).map_err(to_error)?;
        }
        Ok(())
    }
}

/// Print a collapsible block in the Actions log
pub fn print_group(title: &str, body: &str) {
    println!("::group::{}", title);
    println!("{}", body);
    println!("::endgroup::");
}
