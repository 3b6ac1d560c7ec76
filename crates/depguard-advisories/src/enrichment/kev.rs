//! CISA KEV (Known Exploited Vulnerabilities) catalog enrichment (§9
//! supplement): turns an `Advisory.kev` flag from `false` to `true` when the
//! advisory (or one of its aliases) appears in the catalog.

use depguard_core::DepGuardError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize, Serialize)]
struct KevCatalog {
    vulnerabilities: Vec<KevVulnerability>,
}

#[derive(Debug, Deserialize, Serialize)]
struct KevVulnerability {
    #[serde(rename = "cveID")]
    cve_id: String,
}

fn read_err(path: &Path, details: impl Into<String>) -> DepGuardError {
    DepGuardError::FileSystemError {
        path: path.display().to_string(),
        details: details.into(),
    }
}

/// Load the catalog into a set of known-exploited CVE IDs.
pub fn load_kev_catalog<P: AsRef<Path>>(path: P) -> Result<std::collections::HashSet<String>, DepGuardError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| read_err(path, e.to_string()))?;
    let catalog: KevCatalog = serde_json::from_str(&contents)
        .map_err(|e| DepGuardError::ValidationError { details: format!("invalid KEV catalog JSON: {e}") })?;
    Ok(catalog.vulnerabilities.into_iter().map(|v| v.cve_id).collect())
}

/// Check an advisory's primary ID and its known aliases against the catalog.
pub fn is_known_exploited(advisory_id: &str, aliases: &[String], kev: &std::collections::HashSet<String>) -> bool {
    kev.contains(advisory_id) || aliases.iter().any(|a| kev.contains(a))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_catalog(json: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(json.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn loads_cve_ids_from_the_catalog() {
        let file = write_catalog(r#"{"vulnerabilities":[{"cveID":"CVE-2024-1234"},{"cveID":"CVE-2024-5678"}]}"#);
        let kev = load_kev_catalog(file.path()).unwrap();
        assert_eq!(kev.len(), 2);
        assert!(kev.contains("CVE-2024-1234"));
    }

    #[test]
    fn matches_by_alias_when_primary_id_is_not_a_cve() {
        let file = write_catalog(r#"{"vulnerabilities":[{"cveID":"CVE-2024-1234"}]}"#);
        let kev = load_kev_catalog(file.path()).unwrap();
        let aliases = vec!["CVE-2024-1234".to_string()];
        assert!(is_known_exploited("GHSA-xxxx-yyyy-zzzz", &aliases, &kev));
    }

    #[test]
    fn unknown_advisory_is_not_flagged() {
        let file = write_catalog(r#"{"vulnerabilities":[]}"#);
        let kev = load_kev_catalog(file.path()).unwrap();
        assert!(!is_known_exploited("CVE-2024-9999", &[], &kev));
    }
}
