//! Transitive resolver contract (§4.8 phase 2, §6 "optional, per ecosystem:
//! `resolve(manifest-path) → [Dependency]`"). Resolvers here read the
//! lockfile that sits beside the manifest rather than shelling out to
//! `npm`/`cargo`/`go` — the subprocess path the spec allows (§5) is left as
//! an extension point for a deployment willing to pay its 60 s timeout
//! budget; lockfiles already on disk give the same transitive closure for
//! the two ecosystems implemented here without that cost.

use depguard_core::{Dependency, DepGuardError, Ecosystem};
use std::collections::HashMap;
use std::path::Path;

pub trait TransitiveResolver: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;

    /// `manifest_path` is the manifest's own path; the resolver looks for
    /// its lockfile alongside it. Returns `Ok(vec![])`, never an error, when
    /// no lockfile is present — a missing lockfile is not a failure, it
    /// just means no transitive dependencies are reported (§4.8 phase 2
    /// total-failure-tolerance).
    fn resolve(&self, manifest_path: &Path) -> Result<Vec<Dependency>, DepGuardError>;
}

pub struct TransitiveResolverRegistry {
    resolvers: HashMap<Ecosystem, Box<dyn TransitiveResolver>>,
}

impl TransitiveResolverRegistry {
    pub fn with_defaults() -> Self {
        let mut registry = Self { resolvers: HashMap::new() };
        registry.register(Box::new(NpmLockfileResolver));
        registry.register(Box::new(CargoLockfileResolver));
        registry
    }

    pub fn register(&mut self, resolver: Box<dyn TransitiveResolver>) {
        self.resolvers.insert(resolver.ecosystem(), resolver);
    }

    /// `Ok(vec![])` both when no resolver is registered for `ecosystem` and
    /// when the registered resolver finds nothing to resolve.
    pub fn resolve(&self, ecosystem: Ecosystem, manifest_path: &Path) -> Result<Vec<Dependency>, DepGuardError> {
        match self.resolvers.get(&ecosystem) {
            Some(resolver) => resolver.resolve(manifest_path),
            None => Ok(Vec::new()),
        }
    }
}

struct NpmLockfileResolver;

impl TransitiveResolver for NpmLockfileResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn resolve(&self, manifest_path: &Path) -> Result<Vec<Dependency>, DepGuardError> {
        let Some(dir) = manifest_path.parent() else {
            return Ok(Vec::new());
        };
        let lockfile = dir.join("package-lock.json");
        if !lockfile.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&lockfile).map_err(|e| DepGuardError::FileSystemError {
            path: lockfile.display().to_string(),
            details: e.to_string(),
        })?;
        let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| DepGuardError::ManifestParsingError {
            path: lockfile.display().to_string(),
            details: format!("invalid package-lock.json: {e}"),
        })?;

        let mut deps = Vec::new();
        if let Some(serde_json::Value::Object(packages)) = value.get("packages") {
            for (path, meta) in packages {
                if path.is_empty() {
                    continue;
                }
                let Some(name) = path.rsplit("node_modules/").next() else { continue };
                let version = meta.get("version").and_then(|v| v.as_str()).unwrap_or("*").to_string();
                deps.push(Dependency {
                    name: name.to_string(),
                    version,
                    ecosystem: Ecosystem::Npm,
                    transitive: true,
                    dev: meta.get("dev").and_then(|v| v.as_bool()).unwrap_or(false),
                    scope: None,
                });
            }
        }
        Ok(deps)
    }
}

struct CargoLockfileResolver;

impl TransitiveResolver for CargoLockfileResolver {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
    }

    fn resolve(&self, manifest_path: &Path) -> Result<Vec<Dependency>, DepGuardError> {
        let Some(dir) = manifest_path.parent() else {
            return Ok(Vec::new());
        };
        let lockfile = dir.join("Cargo.lock");
        if !lockfile.exists() {
            return Ok(Vec::new());
        }
        let content = std::fs::read_to_string(&lockfile).map_err(|e| DepGuardError::FileSystemError {
            path: lockfile.display().to_string(),
            details: e.to_string(),
        })?;
        let value: toml::Value = content.parse().map_err(|e| DepGuardError::ManifestParsingError {
            path: lockfile.display().to_string(),
            details: format!("invalid Cargo.lock: {e}"),
        })?;

        let mut deps = Vec::new();
        if let Some(toml::Value::Array(packages)) = value.get("package") {
            for pkg in packages {
                let Some(name) = pkg.get("name").and_then(|v| v.as_str()) else { continue };
                let version = pkg.get("version").and_then(|v| v.as_str()).unwrap_or("*").to_string();
                deps.push(Dependency {
                    name: name.to_string(),
                    version,
                    ecosystem: Ecosystem::Cargo,
                    transitive: true,
                    dev: false,
                    scope: None,
                });
            }
        }
        Ok(deps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn npm_resolver_reads_packages_table_from_lockfile() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{}").unwrap();
        fs::write(
            dir.path().join("package-lock.json"),
            r#"{"packages":{"":{},"node_modules/lodash":{"version":"4.17.20"}}}"#,
        )
        .unwrap();

        let registry = TransitiveResolverRegistry::with_defaults();
        let deps = registry.resolve(Ecosystem::Npm, &dir.path().join("package.json")).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].name, "lodash");
        assert!(deps[0].transitive);
    }

    #[test]
    fn missing_lockfile_yields_empty_not_an_error() {
        let dir = TempDir::new().unwrap();
        let manifest_path = dir.path().join("package.json");
        fs::write(&manifest_path, "{}").unwrap();

        let registry = TransitiveResolverRegistry::with_defaults();
        let deps = registry.resolve(Ecosystem::Npm, &manifest_path).unwrap();
        assert!(deps.is_empty());
    }

    #[test]
    fn cargo_resolver_reads_package_array() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("Cargo.toml"), "[dependencies]\n").unwrap();
        fs::write(
            dir.path().join("Cargo.lock"),
            "[[package]]\nname = \"serde\"\nversion = \"1.0.200\"\n",
        )
        .unwrap();

        let registry = TransitiveResolverRegistry::with_defaults();
        let deps = registry.resolve(Ecosystem::Cargo, &dir.path().join("Cargo.toml")).unwrap();
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].version, "1.0.200");
    }
}
