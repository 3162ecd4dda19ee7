//! Message ingestion pipeline.
//!
//! Shared by the API (synchronous ingestion) and the worker binary (queued
//! ingestion): classify a message's free text, materialize the transaction,
//! link the two, and keep the fund's activity pointer fresh. The [`poll`]
//! module drives the same pipeline off the `parse_jobs` queue.

pub mod error;
pub mod pipeline;
pub mod poll;
pub mod retry;

pub use error::IngestError;
pub use pipeline::{ProcessOutcome, UpdateOutcome};
