//! Structured error taxonomy.
//!
//! Every variant carries a stable `code` and a free-form `details` string so
//! callers can log/serialize failures without downcasting. Leaves recover
//! locally from all of these (see each variant's doc comment); only
//! `AnalysisError` is expected to cross out of the reachability engine as a
//! normal, handled outcome rather than a bug.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DepGuardError {
    /// Manifest content didn't match its expected shape. Recovery: skip the
    /// manifest, continue the scan.
    #[error("manifest parsing error ({path}): {details}")]
    ManifestParsingError { path: String, details: String },

    /// An advisory provider call failed. Recovery: retry per policy; on
    /// exhaustion the affected batch yields zero advisories.
    #[error("vulnerability fetch error: {details}")]
    VulnerabilityFetchError { details: String },

    /// Path unreadable or over the size cap. Recovery: skip the file.
    #[error("filesystem error ({path}): {details}")]
    FileSystemError { path: String, details: String },

    /// Invalid input (out-of-range number, malformed path). Recovery: reject
    /// the operation without mutating state.
    #[error("validation error: {details}")]
    ValidationError { details: String },

    /// Invalid input with security implications (path traversal, non-HTTPS
    /// URL). Recovery: reject the operation without mutating state.
    #[error("security error: {details}")]
    SecurityError { details: String },

    /// A network call failed; carries the URL for context. Recovery: retried
    /// by the caller's policy.
    #[error("network error ({url}): {details}")]
    NetworkError { url: String, details: String },

    /// A single advisory's reachability/taint analysis failed. Recovery:
    /// emit the advisory unreachable and continue with the rest.
    #[error("analysis error ({target}): {details}")]
    AnalysisError { target: String, details: String },
}

impl DepGuardError {
    pub fn code(&self) -> &'static str {
        match self {
            DepGuardError::ManifestParsingError { .. } => "MANIFEST_PARSING_ERROR",
            DepGuardError::VulnerabilityFetchError { .. } => "VULNERABILITY_FETCH_ERROR",
            DepGuardError::FileSystemError { .. } => "FILESYSTEM_ERROR",
            DepGuardError::ValidationError { .. } => "VALIDATION_ERROR",
            DepGuardError::SecurityError { .. } => "SECURITY_ERROR",
            DepGuardError::NetworkError { .. } => "NETWORK_ERROR",
            DepGuardError::AnalysisError { .. } => "ANALYSIS_ERROR",
        }
    }

    pub fn details(&self) -> String {
        match self {
            DepGuardError::ManifestParsingError { details, .. } => details.clone(),
            DepGuardError::VulnerabilityFetchError { details } => details.clone(),
            DepGuardError::FileSystemError { details, .. } => details.clone(),
            DepGuardError::ValidationError { details } => details.clone(),
            DepGuardError::SecurityError { details } => details.clone(),
            DepGuardError::NetworkError { details, .. } => details.clone(),
            DepGuardError::AnalysisError { details, .. } => details.clone(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DepGuardError>;
