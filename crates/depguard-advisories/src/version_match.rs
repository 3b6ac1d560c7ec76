//! Version-range matching (§4, advisory resolution): decides whether an
//! installed version falls inside an advisory's `affected_range`.

use depguard_core::DepGuardError;
use semver::{Version, VersionReq};

/// `affected_range` is a semver requirement string (`"<4.17.21"`,
/// `">=1.0.0, <2.0.0"`). Non-semver ecosystems (Go pseudo-versions, git
/// SHAs) fall back to a conservative lexicographic comparison, mirroring
/// the "assume affected on uncertainty" stance advisory matching takes
/// throughout the spec.
pub fn is_version_affected(version: &str, affected_range: &str) -> Result<bool, DepGuardError> {
    match Version::parse(version) {
        Ok(v) => match VersionReq::parse(affected_range) {
            Ok(req) => Ok(req.matches(&v)),
            Err(_) => Ok(is_version_affected_string(version, affected_range)),
        },
        Err(_) => Ok(is_version_affected_string(version, affected_range)),
    }
}

/// Lexicographic fallback for non-semver identifiers (git SHAs, ecosystem
/// pseudo-versions). Unreliable for numeric strings that don't share width
/// (`"10.0" < "2.0"` lexicographically) but adequate for opaque tokens.
fn is_version_affected_string(version: &str, affected_range: &str) -> bool {
    let range = affected_range.trim();
    if let Some(bound) = range.strip_prefix("<=") {
        return version <= bound.trim();
    }
    if let Some(bound) = range.strip_prefix('<') {
        return version < bound.trim();
    }
    if let Some(bound) = range.strip_prefix(">=") {
        return version >= bound.trim();
    }
    if let Some(bound) = range.strip_prefix('>') {
        return version > bound.trim();
    }
    if let Some(exact) = range.strip_prefix('=') {
        return version == exact.trim();
    }
    // Unrecognized range shape: conservative, assume affected.
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semver_less_than_excludes_the_fixed_version() {
        assert!(is_version_affected("4.17.20", "<4.17.21").unwrap());
        assert!(!is_version_affected("4.17.21", "<4.17.21").unwrap());
    }

    #[test]
    fn semver_range_with_lower_and_upper_bound() {
        assert!(is_version_affected("1.5.0", ">=1.0.0, <2.0.0").unwrap());
        assert!(!is_version_affected("2.0.0", ">=1.0.0, <2.0.0").unwrap());
        assert!(!is_version_affected("0.9.0", ">=1.0.0, <2.0.0").unwrap());
    }

    #[test]
    fn non_semver_version_falls_back_to_string_comparison() {
        assert!(is_version_affected("abc123", "<def456").unwrap());
        assert!(!is_version_affected("xyz999", "<def456").unwrap());
    }

    #[test]
    fn unparseable_range_assumes_affected() {
        assert!(is_version_affected("1.0.0", "unknown-range-format").unwrap());
    }
}
