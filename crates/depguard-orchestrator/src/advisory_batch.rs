//! Advisory provider batching (§6: `query(packages: [{ecosystem, name,
//! version}]) → [Advisory]`, batchable in groups of 20). `AdvisoryProvider`
//! in `depguard-advisories` is a simple per-package abstraction; this
//! module is the thin adapter that gives any such provider the batched
//! contract the orchestrator calls, grouping requests into chunks of 20
//! the way a real network-backed provider would want them shaped.

use depguard_advisories::AdvisoryProvider;
use depguard_core::{Advisory, DepGuardError, Ecosystem};
use tracing::warn;

const BATCH_SIZE: usize = 20;

#[derive(Debug, Clone)]
pub struct PackageQuery {
    pub ecosystem: Ecosystem,
    pub name: String,
    pub version: String,
}

/// Query `provider` for every package in `packages`, in batches of
/// `BATCH_SIZE`. A single package's lookup failure is logged and skipped
/// (§7: advisory-fetch failures yield zero advisories for that batch, they
/// don't abort the scan).
pub fn query_advisories(provider: &dyn AdvisoryProvider, packages: &[PackageQuery]) -> Vec<Advisory> {
    let mut advisories = Vec::new();
    for batch in packages.chunks(BATCH_SIZE) {
        for package in batch {
            match provider.fetch(&package.name, package.ecosystem) {
                Ok(found) => advisories.extend(found),
                Err(e) => warn!(
                    package = %package.name,
                    error = %e,
                    "advisory lookup failed, continuing without it"
                ),
            }
        }
    }
    advisories
}

#[cfg(test)]
mod tests {
    use super::*;
    use depguard_advisories::StaticAdvisoryProvider;
    use depguard_core::Severity;

    fn advisory(package: &str) -> Advisory {
        Advisory {
            id: "GHSA-test".to_string(),
            package: package.to_string(),
            affected_range: "<4.17.21".to_string(),
            severity: Severity::High,
            cvss: None,
            epss: None,
            kev: false,
            affected_function: None,
        }
    }

    #[test]
    fn batches_do_not_drop_packages_under_the_chunk_size() {
        let provider = StaticAdvisoryProvider::new(vec![advisory("lodash")]);
        let packages: Vec<PackageQuery> = (0..45)
            .map(|i| PackageQuery { ecosystem: Ecosystem::Npm, name: format!("pkg-{i}"), version: "1.0.0".to_string() })
            .chain(std::iter::once(PackageQuery {
                ecosystem: Ecosystem::Npm,
                name: "lodash".to_string(),
                version: "4.17.20".to_string(),
            }))
            .collect();

        let found = query_advisories(&provider, &packages);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].package, "lodash");
    }

    #[test]
    fn empty_package_list_yields_empty_advisories() {
        let provider = StaticAdvisoryProvider::new(vec![advisory("lodash")]);
        assert!(query_advisories(&provider, &[]).is_empty());
    }
}
