//! Mail Triage: email classification with a guarded inference pipeline.

pub mod config;
pub mod error;
pub mod llm;
pub mod pipeline;
pub mod routes;
