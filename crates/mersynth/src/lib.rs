#![forbid(unsafe_code)]

//! `mersynth` turns short natural-language descriptions into syntactically valid Mermaid
//! diagrams.
//!
//! The deterministic pipeline (template selection, prompt composition, normalization, repair)
//! lives in `mersynth-core` and is re-exported here. This crate adds the completion-backend
//! boundary ([`GenerationClient`]) and the [`Synthesizer`] that sequences everything.
//!
//! The async APIs are runtime-agnostic: no specific executor is required.

pub use mersynth_core::*;

pub mod client;
mod diagram;
mod suite;
mod synth;

pub use client::{BackendError, GenerationClient, GenerationRequest, RawCompletion, StaticClient};
pub use diagram::{DiagramMetadata, GeneratedDiagram, estimate_tokens, next_diagram_id};
pub use suite::{CandidateOutcome, SuiteReport};
pub use synth::{SynthesisError, SynthesisResult, Synthesizer};
