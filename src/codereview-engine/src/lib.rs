//! Code review engine.
//!
//! Turns a code snippet into markdown review feedback:
//! - an ordered chain of external text-generation providers, tried one after the
//!   other until one answers
//! - a deterministic rule-based scanner used when every provider fails or none
//!   is configured
//!
//! The entry point is [`ReviewChain`]; [`scan`] is usable on its own.

pub mod chain;
pub mod error;
pub mod language;
pub mod prompt;
pub mod provider;
pub mod request;
pub mod scanner;

pub use chain::{Analysis, AnalysisSource, ReviewChain};
pub use error::{ProviderError, Result};
pub use provider::{
    HttpProvider, ProviderDescriptor, ProviderKind, ProviderSettings, ReviewProvider,
};
pub use request::AnalysisRequest;
pub use scanner::{CodeMetrics, ScanReport, scan};
