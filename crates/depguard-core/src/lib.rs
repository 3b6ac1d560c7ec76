//! Shared data model, configuration, and error taxonomy for depguard.
//!
//! This crate has no analysis logic of its own; it is the vocabulary every
//! other depguard crate shares (`Manifest`, `Dependency`, `Advisory`,
//! `Finding`, `Config`) plus the structured error taxonomy from the spec's
//! error-handling design.

pub mod advisory;
pub mod config;
pub mod ecosystem;
pub mod error;
pub mod finding;
pub mod manifest;
pub mod path_guard;

pub use advisory::{Advisory, Severity, VulnerableLocation};
pub use config::Config;
pub use ecosystem::{normalize_name, Ecosystem};
pub use error::{DepGuardError, Result};
pub use finding::{rank_findings, DataFlow, DetectionMethod, Finding, Reachability, RiskLabel};
pub use manifest::{Dependency, Manifest, ManifestKind};
pub use path_guard::guard_path;
