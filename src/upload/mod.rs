pub mod error;
pub mod uploader;

pub use error::UploadError;
pub use uploader::{resolve_archives, UploadRequest, Uploader};
