//! Advisory provider contract, CVSS vector parsing, semver-range matching,
//! and EPSS/KEV enrichment.
//!
//! This crate owns everything about turning a third-party advisory feed
//! into the `Advisory` shape `depguard-core` defines; it does not know
//! about call graphs or reachability.

pub mod cvss;
pub mod enrichment;
pub mod provider;
pub mod version_match;

pub use cvss::{base_score_from_vector, Cvss3Vector};
pub use provider::{AdvisoryProvider, StaticAdvisoryProvider};
pub use version_match::is_version_affected;
