// src/main.rs
use clap::{Args, CommandFactory, Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

mod config;
mod logging;
mod outputs;
mod upload;
mod zenodo;
#[cfg(test)]
mod test_utils;

use crate::config::Config;
use crate::outputs::PipelineOutputs;
use crate::upload::{UploadError, UploadRequest, Uploader};
use crate::zenodo::{Metadata, MetadataUpdate, ZenodoClient};

#[derive(Parser, Debug)]
#[command(author, version, about = "Zenodo Uploader", long_about = None)]
struct Cli {
    /// Path to configuration file (defaults to zenodo.toml when present)
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use sandbox.zenodo.org instead of zenodo.org
    #[arg(long, global = true)]
    sandbox: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Upload an archive to Zenodo
    Upload(UploadArgs),
}

#[derive(Args, Debug)]
struct UploadArgs {
    /// Archive to upload (a path or a glob pattern)
    archive: String,

    /// Path to .zenodo.json metadata template
    #[arg(long, value_name = "FILE")]
    zenodo_json: Option<PathBuf>,

    /// Version to upload
    #[arg(long)]
    version: String,

    /// Title to override in upload
    #[arg(long)]
    title: Option<String>,

    /// Description to override in upload as plain text (allows HTML, but be careful about escaping)
    #[arg(long, conflicts_with = "description_file")]
    description: Option<String>,

    /// Description to override in upload from a file
    #[arg(long, value_name = "FILE")]
    description_file: Option<PathBuf>,

    /// An existing concept DOI to add a new version to
    #[arg(long)]
    doi: Option<String>,

    /// URL to use for the release
    #[arg(long)]
    html_url: Option<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        if let Err(e) = Cli::command().print_help() {
            eprintln!("Failed to print help: {}", e);
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    let config = config::load_config_or_default(cli.config.as_deref());
    let logging_config = config.as_ref().ok().and_then(|c| c.logging.as_ref());
    let _log_guard = match logging::init_logging(logging_config, cli.verbose) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {}", e);
            return ExitCode::from(2);
        }
    };

    info!("Zenodo release uploader v{}", env!("CARGO_PKG_VERSION"));

    let config = match config {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return ExitCode::from(2);
        }
    };

    let result = match command {
        Commands::Upload(args) => run_upload(config, cli.sandbox, args).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

/// Validate the upload arguments, build the client and run the upload
async fn run_upload(mut config: Config, sandbox: bool, args: UploadArgs) -> Result<(), UploadError> {
    if sandbox {
        config.zenodo.sandbox = true;
    }
    let config = config.with_token_from_env()?;

    let template = match &args.zenodo_json {
        Some(path) if !path.exists() => {
            return Err(UploadError::Config(format!(
                "{} does not exist.",
                path.display()
            )));
        }
        Some(path) => Some(Metadata::from_template(path)?),
        None => None,
    };

    if let Some(path) = &args.description_file {
        if !path.is_file() {
            return Err(UploadError::Config(format!(
                "Description file {} does not exist.",
                path.display()
            )));
        }
    }

    let request = build_request(args, template);
    let client = ZenodoClient::new(&config.zenodo)?;
    let uploader = Uploader::new(client, PipelineOutputs::from_env());

    let published = uploader.run(&request).await?;
    info!(
        "Uploaded version {} as deposition {}",
        request.metadata.version, published.id
    );
    Ok(())
}

fn build_request(args: UploadArgs, template: Option<Metadata>) -> UploadRequest {
    UploadRequest {
        archive: args.archive,
        doi: args.doi,
        metadata: MetadataUpdate {
            template,
            version: args.version,
            html_url: args.html_url,
            title: args.title,
            description: args.description,
            description_file: args.description_file,
        },
    }
}
