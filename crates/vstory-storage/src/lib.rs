//! S3-compatible object storage client.
//!
//! Staged and queued dispatch modes park uploaded video bytes here before
//! generation; the generator receives a presigned GET URL as its file
//! reference.

pub mod client;
pub mod error;

pub use client::{StorageClient, StorageConfig};
pub use error::{StorageError, StorageResult};
