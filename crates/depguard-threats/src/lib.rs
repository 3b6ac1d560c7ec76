//! Typosquatting detection (§9 supplement): flags a dependency name that is
//! suspiciously close to a well-known package, which is the single
//! supply-chain threat in scope here.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use strsim::{levenshtein, normalized_levenshtein};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ThreatLevel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TyposquattingMatch {
    pub package_name: String,
    pub similar_to: String,
    pub similarity: f64,
    pub edit_distance: usize,
    pub threat_level: ThreatLevel,
    pub patterns: Vec<String>,
}

/// A short list of ecosystem-spanning high-download-count packages likely
/// to be impersonated. Real deployments would load this from a popularity
/// feed; the fixed list keeps detection deterministic here.
pub const POPULAR_PACKAGES: &[&str] = &[
    "lodash", "react", "express", "axios", "chalk", "commander", "request",
    "debug", "async", "moment", "underscore", "webpack", "babel",
    "requests", "numpy", "flask", "django", "pytest", "pandas",
    "spring-boot", "jackson-databind", "guava",
];

/// Compare `package_name` against every entry in `known_packages`, keeping
/// the closest match whose similarity and edit distance both clear the
/// typosquatting thresholds.
pub fn check_typosquatting(package_name: &str, known_packages: &HashSet<String>) -> Option<TyposquattingMatch> {
    let mut best: Option<(String, f64, usize)> = None;

    for known in known_packages {
        if known == package_name {
            continue;
        }
        let similarity = normalized_levenshtein(package_name, known);
        let distance = levenshtein(package_name, known);

        if similarity > 0.8 && similarity < 1.0 && distance <= 2 {
            let is_better = best.as_ref().map(|(_, s, _)| similarity > *s).unwrap_or(true);
            if is_better {
                best = Some((known.clone(), similarity, distance));
            }
        }
    }

    best.map(|(similar_to, similarity, edit_distance)| TyposquattingMatch {
        package_name: package_name.to_string(),
        similar_to,
        similarity,
        edit_distance,
        threat_level: threat_level(similarity, edit_distance),
        patterns: detect_common_patterns(package_name),
    })
}

/// Convenience wrapper over the built-in `POPULAR_PACKAGES` list.
pub fn check_against_popular_packages(package_name: &str) -> Option<TyposquattingMatch> {
    let known: HashSet<String> = POPULAR_PACKAGES.iter().map(|s| s.to_string()).collect();
    check_typosquatting(package_name, &known)
}

fn threat_level(similarity: f64, distance: usize) -> ThreatLevel {
    if similarity > 0.95 && distance == 1 {
        ThreatLevel::Critical
    } else if similarity > 0.9 && distance <= 2 {
        ThreatLevel::High
    } else if similarity > 0.85 {
        ThreatLevel::Medium
    } else {
        ThreatLevel::Low
    }
}

/// Cheap lexical red flags independent of any reference package (§9
/// supplement): these don't by themselves prove typosquatting, so they're
/// surfaced as extra evidence on a `TyposquattingMatch`, not a standalone
/// verdict.
fn detect_common_patterns(package_name: &str) -> Vec<String> {
    let mut patterns = Vec::new();

    if package_name.contains('0') || package_name.contains('1') {
        patterns.push("digit substitution (0/O or 1/l) in package name".to_string());
    }
    if package_name.contains("--") {
        patterns.push("double dash in package name".to_string());
    }
    if package_name.contains('_') && package_name.contains('-') {
        patterns.push("mixed underscore and dash usage".to_string());
    }

    patterns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn known(names: &[&str]) -> HashSet<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn one_character_typo_is_flagged_critical() {
        let result = check_typosquatting("lodahs", &known(&["lodash"])).unwrap();
        assert_eq!(result.similar_to, "lodash");
        assert!(matches!(result.threat_level, ThreatLevel::Critical | ThreatLevel::High));
    }

    #[test]
    fn unrelated_package_is_not_flagged() {
        assert!(check_typosquatting("react", &known(&["lodash"])).is_none());
    }

    #[test]
    fn exact_match_is_not_flagged() {
        assert!(check_typosquatting("lodash", &known(&["lodash"])).is_none());
    }

    #[test]
    fn picks_the_most_similar_known_package_when_several_match() {
        let result = check_typosquatting("expres", &known(&["express", "impress"])).unwrap();
        assert_eq!(result.similar_to, "express");
    }

    #[test]
    fn common_pattern_evidence_is_attached() {
        let result = check_typosquatting("l0dash", &known(&["lodash"])).unwrap();
        assert!(result.patterns.iter().any(|p| p.contains("digit substitution")));
    }

    #[test]
    fn popular_package_shortcut_finds_known_typo() {
        let result = check_against_popular_packages("expres").unwrap();
        assert_eq!(result.similar_to, "express");
    }
}
