//! Conversational inference engine.
//!
//! # Architecture
//!
//! Per subject, the engine maintains 50 weighted parameters grouped into
//! the three personality dimensions. Each incoming message is analyzed
//! by the external text-analyzer capability; the resulting signal set
//! updates parameter values, confidences, and uncertainty ranges, after
//! which the subject's point, signature, and inference phase are
//! recomputed.
//!
//! # Concurrency
//!
//! Single-writer-per-subject: every profile sits behind its own async
//! mutex, so updates to one subject are strictly serialized while
//! different subjects proceed independently. Analyzer calls are bounded
//! by a timeout and degrade to "zero signal for this message" - losing
//! one observation is recoverable, crashing the session is not.

mod decay;
mod engine;
mod update;

pub use decay::decay_confidence;
pub use engine::{InferenceEngine, InferenceOutcome};
pub use update::{apply_signal, derive_update, SignalOutcome, SignalUpdate};
