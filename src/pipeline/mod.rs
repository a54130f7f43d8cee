//! Email classification pipeline.
//!
//! Every email flows through:
//! 1. `normalize_whitespace()`: canonical text
//! 2. `GibberishGate::evaluate()`: cheap heuristics (no backend call)
//! 3. `InferenceBackend::infer()`: external zero-shot or chat model
//! 4. `into_judgement()`: strict ranked parsing or JSON repair
//! 5. `DecisionPolicy::decide()`: threshold + action-keyword override
//! 6. `compose_reply()`: fixed template per category
//!
//! **Only backend contract violations are errors.** Degenerate input and
//! malformed fields always resolve to a valid verdict.

pub mod gibberish;
pub mod judgement;
pub mod normalize;
pub mod policy;
pub mod processor;
pub mod repair;
pub mod reply;
pub mod types;

pub use processor::Classifier;
pub use types::{Category, NormalizedVerdict};
