//! Advisory provider contract (§6): the orchestrator's phase 3 depends only
//! on this trait, never on a concrete source, so OSV/GHSA/NVD-backed
//! implementations can be swapped in without touching the pipeline.

use depguard_core::{Advisory, DepGuardError, Ecosystem};

pub trait AdvisoryProvider {
    /// Look up advisories affecting `package` in `ecosystem`. An empty
    /// vector means "no known advisories", not an error; providers should
    /// reserve `Err` for fetch/parse failures (§7 `VulnerabilityFetchError`).
    fn fetch(&self, package: &str, ecosystem: Ecosystem) -> Result<Vec<Advisory>, DepGuardError>;
}

/// An `AdvisoryProvider` backed by a fixed, in-memory list. Used for tests
/// and for offline runs seeded from a pre-fetched advisory dump.
pub struct StaticAdvisoryProvider {
    advisories: Vec<Advisory>,
}

impl StaticAdvisoryProvider {
    pub fn new(advisories: Vec<Advisory>) -> Self {
        Self { advisories }
    }
}

impl AdvisoryProvider for StaticAdvisoryProvider {
    fn fetch(&self, package: &str, _ecosystem: Ecosystem) -> Result<Vec<Advisory>, DepGuardError> {
        Ok(self.advisories.iter().filter(|a| a.package == package).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use depguard_core::Severity;

    fn advisory(package: &str) -> Advisory {
        Advisory {
            id: "GHSA-test".to_string(),
            package: package.to_string(),
            affected_range: "<1.0.0".to_string(),
            severity: Severity::High,
            cvss: None,
            epss: None,
            kev: false,
            affected_function: None,
        }
    }

    #[test]
    fn static_provider_filters_by_package_name() {
        let provider = StaticAdvisoryProvider::new(vec![advisory("lodash"), advisory("axios")]);
        let found = provider.fetch("lodash", Ecosystem::Npm).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].package, "lodash");
    }

    #[test]
    fn static_provider_returns_empty_not_error_when_unknown() {
        let provider = StaticAdvisoryProvider::new(vec![]);
        let found = provider.fetch("left-pad", Ecosystem::Npm).unwrap();
        assert!(found.is_empty());
    }
}
