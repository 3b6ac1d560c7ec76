use crate::advisory::{Advisory, VulnerableLocation};
use serde::{Deserialize, Serialize};

/// Which strategy (or combination) produced a reachability verdict. The
/// closed set from §3; `Composite` covers the "S3 boosted S1" case, with the
/// exact combination recorded in `Reachability::detection_detail` (e.g.
/// `"call-graph+pattern"`) so the tag isn't lost to the closed enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    CallGraph,
    ImportDetection,
    PatternMatching,
    TransitiveImport,
    None,
    Composite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reachability {
    pub is_reachable: bool,
    pub confidence: f64,
    pub shortest_path_length: usize,
    /// Up to the top 3 paths, each a sequence of call-graph node keys or
    /// synthesized strategy evidence (e.g. `["file.js", "lodash (imported)"]`).
    pub paths: Vec<Vec<String>>,
    pub detection_method: DetectionMethod,
    /// Set only for `Composite` results, e.g. `"call-graph+pattern"`.
    pub detection_detail: Option<String>,
}

impl Reachability {
    pub fn unreachable() -> Self {
        Self {
            is_reachable: false,
            confidence: 0.0,
            shortest_path_length: 0,
            paths: Vec::new(),
            detection_method: DetectionMethod::None,
            detection_detail: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLabel {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataFlow {
    pub is_tainted: bool,
    pub confidence: f64,
    pub sources: Vec<String>,
    pub sanitizers: Vec<String>,
    pub risk: RiskLabel,
}

/// One advisory's outcome for one project (§3). Every advisory submitted to
/// the engine is emitted exactly once, reachable or not (invariant 4, §8).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub package: String,
    pub advisory: Advisory,
    pub location: Option<VulnerableLocation>,
    pub reachability: Reachability,
    pub data_flow: Option<DataFlow>,
    /// Mirrors `reachability.is_reachable` at the top level for convenience
    /// of consumers that only care about the headline verdict.
    pub is_reachable: bool,
    /// Mirrors `reachability.confidence` (post taint-merge, §4.7) at the top
    /// level.
    pub confidence: f64,
}

impl Finding {
    pub fn unreachable(
        package: String,
        advisory: Advisory,
        location: Option<VulnerableLocation>,
    ) -> Self {
        let reachability = Reachability::unreachable();
        Self {
            package,
            advisory,
            location,
            is_reachable: reachability.is_reachable,
            confidence: reachability.confidence,
            reachability,
            data_flow: None,
        }
    }

    /// Ranking key for invariant 5 (§8): reachable before unreachable, then
    /// descending confidence.
    pub fn rank_key(&self) -> (std::cmp::Reverse<bool>, std::cmp::Reverse<OrderedF64>) {
        (
            std::cmp::Reverse(self.is_reachable),
            std::cmp::Reverse(OrderedF64(self.confidence)),
        )
    }
}

/// `f64` wrapper with a total order, for use only as a sort key where NaN
/// cannot occur (confidences are always clamped to `[0, 1]`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrderedF64(pub f64);

impl Eq for OrderedF64 {}

impl PartialOrd for OrderedF64 {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for OrderedF64 {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(std::cmp::Ordering::Equal)
    }
}

/// Sort findings per invariant 5 in §8: reachable first, then by descending
/// confidence.
pub fn rank_findings(findings: &mut [Finding]) {
    findings.sort_by_key(|f| f.rank_key());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisory::Severity;

    fn advisory(id: &str) -> Advisory {
        Advisory {
            id: id.to_string(),
            package: "lodash".to_string(),
            affected_range: "<4.17.21".to_string(),
            severity: Severity::High,
            cvss: Some(7.5),
            epss: None,
            kev: false,
            affected_function: None,
        }
    }

    #[test]
    fn ranking_orders_reachable_before_unreachable_then_by_confidence() {
        let mut low = Finding::unreachable("a".into(), advisory("A"), None);
        low.is_reachable = true;
        low.confidence = 0.4;
        low.reachability.is_reachable = true;
        low.reachability.confidence = 0.4;

        let mut high = Finding::unreachable("b".into(), advisory("B"), None);
        high.is_reachable = true;
        high.confidence = 0.9;
        high.reachability.is_reachable = true;
        high.reachability.confidence = 0.9;

        let unreachable = Finding::unreachable("c".into(), advisory("C"), None);

        let mut findings = vec![low.clone(), unreachable.clone(), high.clone()];
        rank_findings(&mut findings);

        assert_eq!(findings[0].advisory.id, "B");
        assert_eq!(findings[1].advisory.id, "A");
        assert_eq!(findings[2].advisory.id, "C");
    }
}
