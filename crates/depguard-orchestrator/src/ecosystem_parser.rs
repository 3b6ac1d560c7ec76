//! Ecosystem parser contract and registry (§4.8 phase 2, §6
//! `parse(content, manifest) → [Dependency]`): turns a manifest's raw
//! content into declared dependencies. One parser per ecosystem, looked up
//! by `Manifest::ecosystem` through the registry.

use depguard_core::{Dependency, DepGuardError, Ecosystem, Manifest};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

pub trait EcosystemParser: Send + Sync {
    fn ecosystem(&self) -> Ecosystem;
    fn parse(&self, content: &str, manifest: &Manifest) -> Result<Vec<Dependency>, DepGuardError>;
}

pub struct EcosystemParserRegistry {
    parsers: HashMap<Ecosystem, Box<dyn EcosystemParser>>,
}

impl EcosystemParserRegistry {
    /// Registry pre-populated with the built-in parsers (§9 "registry map
    /// from ecosystem-id → implementation").
    pub fn with_defaults() -> Self {
        let mut registry = Self { parsers: HashMap::new() };
        registry.register(Box::new(NpmParser));
        registry.register(Box::new(PypiParser));
        registry.register(Box::new(CargoParser));
        registry.register(Box::new(GoParser));
        registry
    }

    pub fn register(&mut self, parser: Box<dyn EcosystemParser>) {
        self.parsers.insert(parser.ecosystem(), parser);
    }

    /// Parse `manifest`'s content, or `Ok(vec![])` if no parser is
    /// registered for its ecosystem — an unregistered ecosystem is not an
    /// error, it just yields no declared dependencies for that manifest.
    pub fn parse(&self, content: &str, manifest: &Manifest) -> Result<Vec<Dependency>, DepGuardError> {
        match self.parsers.get(&manifest.ecosystem) {
            Some(parser) => parser.parse(content, manifest),
            None => Ok(Vec::new()),
        }
    }
}

struct NpmParser;

impl EcosystemParser for NpmParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Npm
    }

    fn parse(&self, content: &str, manifest: &Manifest) -> Result<Vec<Dependency>, DepGuardError> {
        if manifest.filename != "package.json" {
            return Ok(Vec::new());
        }
        let value: serde_json::Value = serde_json::from_str(content).map_err(|e| DepGuardError::ManifestParsingError {
            path: manifest.path.display().to_string(),
            details: format!("invalid package.json: {e}"),
        })?;

        let mut deps = Vec::new();
        collect_npm_table(&value, "dependencies", false, &mut deps);
        collect_npm_table(&value, "devDependencies", true, &mut deps);
        Ok(deps)
    }
}

fn collect_npm_table(value: &serde_json::Value, key: &str, dev: bool, out: &mut Vec<Dependency>) {
    let Some(serde_json::Value::Object(map)) = value.get(key) else {
        return;
    };
    for (name, version) in map {
        let version = version.as_str().unwrap_or("*").to_string();
        out.push(Dependency {
            name: name.clone(),
            version,
            ecosystem: Ecosystem::Npm,
            transitive: false,
            dev,
            scope: None,
        });
    }
}

struct PypiParser;

static REQUIREMENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9_.\-]+)\s*(?:\[[^\]]*\])?\s*(==|>=|<=|~=|>|<)?\s*([A-Za-z0-9_.\-]*)").unwrap());

impl EcosystemParser for PypiParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Pypi
    }

    fn parse(&self, content: &str, _manifest: &Manifest) -> Result<Vec<Dependency>, DepGuardError> {
        let mut deps = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
                continue;
            }
            if let Some(caps) = REQUIREMENT_LINE.captures(line) {
                let name = caps.get(1).unwrap().as_str().to_string();
                let version = caps.get(3).map(|m| m.as_str()).filter(|s| !s.is_empty()).unwrap_or("*").to_string();
                deps.push(Dependency {
                    name,
                    version,
                    ecosystem: Ecosystem::Pypi,
                    transitive: false,
                    dev: false,
                    scope: None,
                });
            }
        }
        Ok(deps)
    }
}

struct CargoParser;

impl EcosystemParser for CargoParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Cargo
    }

    fn parse(&self, content: &str, manifest: &Manifest) -> Result<Vec<Dependency>, DepGuardError> {
        let value: toml::Value = content.parse().map_err(|e| DepGuardError::ManifestParsingError {
            path: manifest.path.display().to_string(),
            details: format!("invalid Cargo.toml: {e}"),
        })?;

        let mut deps = Vec::new();
        collect_cargo_table(&value, "dependencies", false, &mut deps);
        collect_cargo_table(&value, "dev-dependencies", true, &mut deps);
        Ok(deps)
    }
}

fn collect_cargo_table(value: &toml::Value, key: &str, dev: bool, out: &mut Vec<Dependency>) {
    let Some(toml::Value::Table(table)) = value.get(key) else {
        return;
    };
    for (name, spec) in table {
        let version = match spec {
            toml::Value::String(v) => v.clone(),
            toml::Value::Table(t) => t.get("version").and_then(|v| v.as_str()).unwrap_or("*").to_string(),
            _ => "*".to_string(),
        };
        out.push(Dependency {
            name: name.clone(),
            version,
            ecosystem: Ecosystem::Cargo,
            transitive: false,
            dev,
            scope: None,
        });
    }
}

struct GoParser;

static GO_REQUIRE_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*([^\s]+)\s+(v[^\s]+)").unwrap());

impl EcosystemParser for GoParser {
    fn ecosystem(&self) -> Ecosystem {
        Ecosystem::Go
    }

    fn parse(&self, content: &str, _manifest: &Manifest) -> Result<Vec<Dependency>, DepGuardError> {
        let mut deps = Vec::new();
        let mut in_require_block = false;
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("require (") {
                in_require_block = true;
                continue;
            }
            if in_require_block && trimmed == ")" {
                in_require_block = false;
                continue;
            }
            let body = if in_require_block {
                Some(trimmed)
            } else {
                trimmed.strip_prefix("require ")
            };
            let Some(body) = body else { continue };
            if let Some(caps) = GO_REQUIRE_LINE.captures(body) {
                deps.push(Dependency {
                    name: caps.get(1).unwrap().as_str().to_string(),
                    version: caps.get(2).unwrap().as_str().to_string(),
                    ecosystem: Ecosystem::Go,
                    transitive: false,
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
    use depguard_core::ManifestKind;
    use std::path::PathBuf;

    fn manifest(filename: &str, ecosystem: Ecosystem) -> Manifest {
        Manifest {
            path: PathBuf::from(filename),
            filename: filename.to_string(),
            ecosystem,
            kind: ManifestKind::Manifest,
            directory: PathBuf::from("."),
            confidence: 0.95,
        }
    }

    #[test]
    fn npm_parser_reads_dependencies_and_dev_dependencies() {
        let registry = EcosystemParserRegistry::with_defaults();
        let m = manifest("package.json", Ecosystem::Npm);
        let deps = registry
            .parse(r#"{"dependencies":{"lodash":"4.17.20"},"devDependencies":{"jest":"29.0.0"}}"#, &m)
            .unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().any(|d| d.name == "lodash" && !d.dev));
        assert!(deps.iter().any(|d| d.name == "jest" && d.dev));
    }

    #[test]
    fn pypi_parser_reads_pinned_requirement() {
        let registry = EcosystemParserRegistry::with_defaults();
        let m = manifest("requirements.txt", Ecosystem::Pypi);
        let deps = registry.parse("pyyaml==5.3.1\n# comment\n\nrequests>=2.0\n", &m).unwrap();
        assert_eq!(deps.len(), 2);
        assert_eq!(deps[0].name, "pyyaml");
        assert_eq!(deps[0].version, "5.3.1");
    }

    #[test]
    fn cargo_parser_reads_dependencies_table() {
        let registry = EcosystemParserRegistry::with_defaults();
        let m = manifest("Cargo.toml", Ecosystem::Cargo);
        let deps = registry
            .parse("[dependencies]\nserde = \"1.0\"\n\n[dev-dependencies]\ntempfile = \"3\"\n", &m)
            .unwrap();
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().any(|d| d.name == "tempfile" && d.dev));
    }

    #[test]
    fn go_parser_reads_single_line_and_block_requires() {
        let registry = EcosystemParserRegistry::with_defaults();
        let m = manifest("go.mod", Ecosystem::Go);
        let deps = registry
            .parse(
                "module example.com/app\n\nrequire example.com/one v1.2.3\n\nrequire (\n\texample.com/two v0.4.0\n)\n",
                &m,
            )
            .unwrap();
        assert_eq!(deps.len(), 2);
    }

    #[test]
    fn unregistered_ecosystem_yields_no_dependencies_not_an_error() {
        let registry = EcosystemParserRegistry::with_defaults();
        let m = manifest("Gemfile", Ecosystem::Rubygems);
        let deps = registry.parse("gem 'rails'", &m).unwrap();
        assert!(deps.is_empty());
    }
}
