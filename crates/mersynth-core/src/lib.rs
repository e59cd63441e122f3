#![forbid(unsafe_code)]

//! Deterministic core of the Mermaid synthesis pipeline.
//!
//! Everything here is synchronous and free of I/O:
//! - [`catalog`]: the fixed template table
//! - [`select`]: rule-ordered template selection and suite relevance
//! - [`prompt`]: generation and repair prompt composition
//! - [`normalize`]: ordered cleanup passes for backend output
//! - [`declaration`]: diagram declaration detection and inference
//! - [`validate`] / [`repair`]: structural defect detection and targeted fixes

pub mod catalog;
pub mod config;
pub mod declaration;
pub mod error;
pub mod normalize;
pub mod options;
pub mod prompt;
pub mod repair;
pub mod select;
pub mod validate;

pub use catalog::{Template, TemplateCategory};
pub use config::{SamplingParams, SynthesisConfig};
pub use declaration::{Declaration, detect_declaration, ensure_declaration};
pub use error::{Error, Result};
pub use normalize::normalize;
pub use options::{Complexity, GenerationOptions, Style};
pub use repair::{repair, validate_and_repair};
pub use select::{select, suite_candidates};
pub use validate::{Issue, Missing, detect};

/// Normalizes raw backend output and guarantees a declaration after any preamble.
pub fn clean_code(raw: &str) -> String {
    ensure_declaration(&normalize(raw))
}

/// The full deterministic pipeline: normalize, declare, detect, repair.
pub fn sanitize_code(raw: &str) -> String {
    validate_and_repair(&clean_code(raw))
}
