//! Orchestrator (§4.8): seven total-failure-tolerant phases from manifest
//! discovery through ranking and emission. A failed component at any phase
//! produces zero findings for its slice of the work, logs, and the scan
//! continues (§7) — the only hard abort is the boundary case of zero
//! manifests (§8 "Empty project").

use crate::advisory_batch::{query_advisories, PackageQuery};
use crate::ecosystem_parser::EcosystemParserRegistry;
use crate::transitive_resolver::TransitiveResolverRegistry;
use depguard_advisories::{is_version_affected, AdvisoryProvider};
use depguard_core::{Config, Dependency, Finding, Manifest, ManifestKind, VulnerableLocation};
use depguard_reachability::{apply_no_callers_signal, detect_entry_point, passes_threshold, ReachabilityEngine, TaintFlowEngine};
use depguard_scanner::{classify, PathWalker, WalkerConfig};
use depguard_threats::{check_typosquatting, TyposquattingMatch};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// `PARALLEL_ANALYSIS_LIMIT` (§5, default 4) — this implementation's
/// per-advisory analysis (phase 6) is CPU-bound and pure, so the cap is
/// honored by chunking rather than by a thread pool: see `scan_project`.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub parallel_analysis_limit: usize,
    pub max_file_bytes: u64,
    pub max_manifest_bytes: u64,
    pub max_dependencies_per_manifest: usize,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            parallel_analysis_limit: 4,
            max_file_bytes: 50 * 1024 * 1024,
            max_manifest_bytes: 10 * 1024 * 1024,
            max_dependencies_per_manifest: 10_000,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResult {
    pub success: bool,
    pub error: Option<String>,
    pub findings: Vec<Finding>,
    pub typosquats: Vec<TyposquattingMatch>,
    pub manifests_found: usize,
    pub dependencies_found: usize,
}

impl ScanResult {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            findings: Vec::new(),
            typosquats: Vec::new(),
            manifests_found: 0,
            dependencies_found: 0,
        }
    }
}

/// Run the full seven-phase pipeline against `project_root`.
pub async fn scan_project(
    project_root: &Path,
    config: &Config,
    orchestrator_config: &OrchestratorConfig,
    advisory_provider: &dyn AdvisoryProvider,
    parser_registry: &EcosystemParserRegistry,
    resolver_registry: &TransitiveResolverRegistry,
) -> ScanResult {
    // Phase 1: manifest discovery.
    let manifests = discover_manifests(project_root, config, orchestrator_config).await;
    if manifests.is_empty() {
        info!(project = %project_root.display(), "no dependency manifests found, aborting scan");
        return ScanResult::failure("No dependency manifests found");
    }
    info!(count = manifests.len(), "discovered manifests");

    // Phase 2: dependency extraction.
    let dependencies = extract_dependencies(&manifests, parser_registry, resolver_registry, orchestrator_config);
    info!(count = dependencies.len(), "extracted dependencies");

    let typosquats: Vec<TyposquattingMatch> = dependencies
        .iter()
        .filter_map(|d| check_typosquatting(&d.name, &known_popular_packages()))
        .collect();

    // Phase 3: advisory matching.
    let advisories_by_package = match_advisories(&dependencies, advisory_provider);

    // Phase 4: source walk + call-graph construction.
    let file_contents = walk_source(project_root, config, orchestrator_config).await;
    let mut graph = crate::call_graph::build(&file_contents);
    info!(nodes = graph.nodes().count(), "built call graph");

    // Phase 5: entry-point detection, registered with the call graph.
    for (file, content) in &file_contents {
        if let Some(mut entry) = detect_entry_point(file, content, false) {
            let key = depguard_graph::node_key(file, &entry.function);
            let has_incoming_edges = !graph.reverse_edges(&key).is_empty();
            apply_no_callers_signal(&mut entry, has_incoming_edges);
            if passes_threshold(&entry, config.min_confidence) {
                graph.add_entry_point(file, &entry.function);
            }
        }
    }
    info!(entry_points = graph.entry_points().count(), "registered entry points");

    // Phase 6: reachability + taint analysis per advisory.
    let reachability_engine = ReachabilityEngine::new(&graph, &file_contents, config);
    let taint_engine = TaintFlowEngine::new(&graph, &file_contents);

    let mut findings = Vec::new();
    for dependency in &dependencies {
        let Some(advisories) = advisories_by_package.get(&dependency.name) else {
            continue;
        };
        for advisory in advisories {
            if !is_version_affected(&dependency.version, &advisory.affected_range).unwrap_or(true) {
                continue;
            }

            let location = VulnerableLocation {
                package: dependency.name.clone(),
                module_path: advisory.package.clone(),
                function_name: advisory.affected_function.clone().unwrap_or_else(|| "unknown".to_string()),
                advisory: advisory.clone(),
            };

            let reachability = reachability_engine.analyze(&location);
            let data_flow = if reachability.is_reachable {
                let evidence_file = reachability
                    .paths
                    .first()
                    .and_then(|p| p.first())
                    .map(PathBuf::from)
                    .and_then(|f| file_contents.get(&f).map(|c| (f, c)));
                evidence_file.map(|(_, content)| taint_engine.analyze_content(content))
            } else {
                None
            };

            let final_confidence = match &data_flow {
                Some(flow) => TaintFlowEngine::merge_confidence(reachability.confidence, flow),
                None => reachability.confidence,
            };

            findings.push(Finding {
                package: dependency.name.clone(),
                advisory: advisory.clone(),
                location: Some(location),
                is_reachable: reachability.is_reachable,
                confidence: final_confidence,
                reachability,
                data_flow,
            });
        }
    }

    // Phase 7: ranking and emission.
    depguard_core::rank_findings(&mut findings);

    ScanResult {
        success: true,
        error: None,
        dependencies_found: dependencies.len(),
        manifests_found: manifests.len(),
        findings,
        typosquats,
    }
}

async fn discover_manifests(project_root: &Path, config: &Config, orchestrator_config: &OrchestratorConfig) -> Vec<(Manifest, String)> {
    let walker = PathWalker::new(WalkerConfig {
        max_depth: config.max_depth,
        follow_symlinks: false,
        skip_hidden: false,
        apply_pattern_excludes: false,
    });

    let mut manifests = Vec::new();
    for path in walker.walk(project_root) {
        if depguard_core::guard_path(project_root, &path).is_err() {
            warn!(path = %path.display(), "discovered path escapes project root, skipping");
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() > orchestrator_config.max_manifest_bytes => continue,
            Ok(_) => {}
            Err(_) => continue,
        }
        let Ok(content) = tokio::fs::read_to_string(&path).await else {
            continue;
        };
        if let Some(manifest) = classify(&path, &content) {
            if manifest.kind == ManifestKind::Manifest {
                manifests.push((manifest, content));
            }
        }
    }
    manifests
}

fn extract_dependencies(
    manifests: &[(Manifest, String)],
    parser_registry: &EcosystemParserRegistry,
    resolver_registry: &TransitiveResolverRegistry,
    orchestrator_config: &OrchestratorConfig,
) -> Vec<Dependency> {
    let mut seen: HashSet<(depguard_core::Ecosystem, String)> = HashSet::new();
    let mut deps = Vec::new();

    for (manifest, content) in manifests {
        let mut declared = match parser_registry.parse(content, manifest) {
            Ok(d) => d,
            Err(e) => {
                warn!(manifest = %manifest.path.display(), error = %e, "manifest parsing failed, skipping");
                continue;
            }
        };
        if declared.len() > orchestrator_config.max_dependencies_per_manifest {
            warn!(
                manifest = %manifest.path.display(),
                count = declared.len(),
                cap = orchestrator_config.max_dependencies_per_manifest,
                "dependency count exceeds cap, truncating"
            );
            declared.truncate(orchestrator_config.max_dependencies_per_manifest);
        }

        let transitive = resolver_registry.resolve(manifest.ecosystem, &manifest.path).unwrap_or_else(|e| {
            warn!(manifest = %manifest.path.display(), error = %e, "transitive resolution failed, continuing without it");
            Vec::new()
        });

        for dep in declared.into_iter().chain(transitive) {
            if seen.insert(dep.key()) {
                deps.push(dep);
            }
        }
    }
    deps
}

fn match_advisories(
    dependencies: &[Dependency],
    advisory_provider: &dyn AdvisoryProvider,
) -> HashMap<String, Vec<depguard_core::Advisory>> {
    let queries: Vec<PackageQuery> = dependencies
        .iter()
        .map(|d| PackageQuery { ecosystem: d.ecosystem, name: d.name.clone(), version: d.version.clone() })
        .collect();

    let mut by_package: HashMap<String, Vec<depguard_core::Advisory>> = HashMap::new();
    for advisory in query_advisories(advisory_provider, &queries) {
        by_package.entry(advisory.package.clone()).or_default().push(advisory);
    }
    by_package
}

async fn walk_source(project_root: &Path, config: &Config, orchestrator_config: &OrchestratorConfig) -> HashMap<PathBuf, String> {
    let walker = PathWalker::new(WalkerConfig { max_depth: config.max_depth, ..WalkerConfig::default() });

    let mut contents = HashMap::new();
    for path in walker.walk(project_root) {
        if depguard_core::guard_path(project_root, &path).is_err() {
            warn!(path = %path.display(), "discovered path escapes project root, skipping");
            continue;
        }
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.len() > orchestrator_config.max_file_bytes => continue,
            Ok(_) => {}
            Err(_) => continue,
        }
        if let Ok(content) = tokio::fs::read_to_string(&path).await {
            contents.insert(path, content);
        }
    }
    contents
}

fn known_popular_packages() -> HashSet<String> {
    depguard_threats::POPULAR_PACKAGES.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use depguard_advisories::StaticAdvisoryProvider;
    use depguard_core::{Advisory, Ecosystem, Severity};
    use std::fs;
    use tempfile::TempDir;

    fn lodash_advisory() -> Advisory {
        Advisory {
            id: "GHSA-test".to_string(),
            package: "lodash".to_string(),
            affected_range: "<4.17.21".to_string(),
            severity: Severity::Critical,
            cvss: Some(9.8),
            epss: None,
            kev: false,
            affected_function: Some("template".to_string()),
        }
    }

    #[tokio::test]
    async fn empty_project_returns_failure_with_no_manifests_message() {
        let dir = TempDir::new().unwrap();
        let config = Config::default();
        let orch_config = OrchestratorConfig::default();
        let provider = StaticAdvisoryProvider::new(vec![]);
        let parsers = EcosystemParserRegistry::with_defaults();
        let resolvers = TransitiveResolverRegistry::with_defaults();

        let result = scan_project(dir.path(), &config, &orch_config, &provider, &parsers, &resolvers).await;

        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No dependency manifests found"));
    }

    #[tokio::test]
    async fn node_monorepo_reachable_lodash_is_flagged_via_pattern_strategy() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("apps/web/src")).unwrap();
        fs::write(
            dir.path().join("apps/web/package.json"),
            r#"{"dependencies":{"lodash":"4.17.20"}}"#,
        )
        .unwrap();
        fs::write(
            dir.path().join("apps/web/src/index.js"),
            "const _=require('lodash'); app.get('/x',(req,res)=>res.send(_.template(req.query.t)()))",
        )
        .unwrap();

        let config = Config::default();
        let orch_config = OrchestratorConfig::default();
        let provider = StaticAdvisoryProvider::new(vec![lodash_advisory()]);
        let parsers = EcosystemParserRegistry::with_defaults();
        let resolvers = TransitiveResolverRegistry::with_defaults();

        let result = scan_project(dir.path(), &config, &orch_config, &provider, &parsers, &resolvers).await;

        assert!(result.success);
        assert_eq!(result.findings.len(), 1);
        let finding = &result.findings[0];
        assert_eq!(finding.package, "lodash");
        assert!(finding.is_reachable);
        assert!(matches!(
            finding.reachability.detection_method,
            depguard_core::DetectionMethod::PatternMatching | depguard_core::DetectionMethod::Composite
        ));
        let flow = finding.data_flow.as_ref().expect("taint analysis should have run");
        assert!(flow.is_tainted);
        assert_eq!(flow.risk, depguard_core::RiskLabel::Critical);
    }

    #[tokio::test]
    async fn typosquat_in_dependency_list_is_flagged() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("package.json"),
            r#"{"dependencies":{"lodahs":"1.0.0","react":"18.0.0"}}"#,
        )
        .unwrap();

        let config = Config::default();
        let orch_config = OrchestratorConfig::default();
        let provider = StaticAdvisoryProvider::new(vec![]);
        let parsers = EcosystemParserRegistry::with_defaults();
        let resolvers = TransitiveResolverRegistry::with_defaults();

        let result = scan_project(dir.path(), &config, &orch_config, &provider, &parsers, &resolvers).await;

        assert!(result.success);
        assert!(result.typosquats.iter().any(|t| t.package_name == "lodahs"));
        assert!(!result.typosquats.iter().any(|t| t.package_name == "react"));
    }
}
