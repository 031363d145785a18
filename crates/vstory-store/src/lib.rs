//! In-memory job store.
//!
//! This crate provides:
//! - The process-wide mapping from job ID to job record
//! - Record-level atomic lifecycle transitions
//! - The aggregate-status fold recomputed after every transition

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::JobStore;
