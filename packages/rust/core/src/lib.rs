//! Core pipeline orchestration for Threatwire.
//!
//! Ties collection, enrichment, notification, and report persistence into
//! the end-to-end run ([`pipeline::run`]) and its failure-notifying wrapper
//! ([`pipeline::run_notified`]).

pub mod pipeline;

pub use pipeline::{PipelineOutcome, run, run_notified};
