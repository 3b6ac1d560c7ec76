//! EPSS (Exploit Prediction Scoring System) CSV enrichment (§9 supplement):
//! attaches a `0.0..1.0` exploitation-probability score to `Advisory.epss`.

use depguard_core::DepGuardError;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Parse the published EPSS CSV (`cve,epss,percentile`, with an optional
/// leading `#`-prefixed metadata line) into a `cve -> score` map.
pub fn load_epss_scores<P: AsRef<Path>>(path: P) -> Result<HashMap<String, f64>, DepGuardError> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DepGuardError::FileSystemError {
        path: path.display().to_string(),
        details: e.to_string(),
    })?;
    let reader = BufReader::new(file);
    let mut scores = HashMap::new();

    for line in reader.lines() {
        let line = line.map_err(|e| DepGuardError::FileSystemError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') || trimmed.to_lowercase().starts_with("cve,") {
            continue;
        }

        let parts: Vec<&str> = trimmed.split(',').collect();
        if parts.len() < 2 {
            continue;
        }
        if let Ok(score) = parts[1].trim().parse::<f64>() {
            scores.insert(parts[0].trim().to_string(), score);
        }
    }

    Ok(scores)
}

/// Resolve a score by advisory ID, falling back through its aliases.
pub fn find_epss_score(advisory_id: &str, aliases: &[String], scores: &HashMap<String, f64>) -> Option<f64> {
    scores
        .get(advisory_id)
        .copied()
        .or_else(|| aliases.iter().find_map(|alias| scores.get(alias).copied()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut f = NamedTempFile::new().unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
        f
    }

    #[test]
    fn parses_scores_skipping_header_and_comments() {
        let file = write_csv("#model_version:v2023.03.01\ncve,epss,percentile\nCVE-2024-1234,0.55,0.9\n");
        let scores = load_epss_scores(file.path()).unwrap();
        assert_eq!(scores.get("CVE-2024-1234"), Some(&0.55));
    }

    #[test]
    fn malformed_rows_are_skipped_not_fatal() {
        let file = write_csv("cve,epss,percentile\nCVE-2024-1234,not_a_number,0.9\nCVE-2024-5678,0.7,0.5\n");
        let scores = load_epss_scores(file.path()).unwrap();
        assert_eq!(scores.len(), 1);
        assert!(scores.contains_key("CVE-2024-5678"));
    }

    #[test]
    fn resolves_score_via_alias() {
        let mut scores = HashMap::new();
        scores.insert("CVE-2024-1234".to_string(), 0.8);
        let found = find_epss_score("GHSA-xxxx", &["CVE-2024-1234".to_string()], &scores);
        assert_eq!(found, Some(0.8));
    }
}
