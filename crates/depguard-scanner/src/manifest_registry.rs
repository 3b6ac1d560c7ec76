//! Manifest Registry (§4.3): filename patterns map to
//! `(ecosystem, kind, confidence, content-validator)`. Both the filename
//! pattern and the content validator must succeed to produce a `Manifest`.

use depguard_core::{Ecosystem, Manifest, ManifestKind};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

type Validator = fn(&str) -> bool;

fn always_valid(_content: &str) -> bool {
    true
}

fn validate_package_json(content: &str) -> bool {
    match serde_json::from_str::<serde_json::Value>(content) {
        Ok(serde_json::Value::Object(map)) => {
            map.contains_key("dependencies") || map.contains_key("devDependencies")
        }
        _ => false,
    }
}

fn validate_go_mod(content: &str) -> bool {
    content.trim_start().starts_with("module ")
}

fn validate_pyproject_toml(content: &str) -> bool {
    content.contains("[tool.poetry.dependencies]") || content.contains("[project.dependencies]")
}

struct ExactRule {
    filename: &'static str,
    ecosystem: Ecosystem,
    kind: ManifestKind,
    confidence: f64,
    validator: Validator,
}

const EXACT_RULES: &[ExactRule] = &[
    ExactRule { filename: "package.json", ecosystem: Ecosystem::Npm, kind: ManifestKind::Manifest, confidence: 0.95, validator: validate_package_json },
    ExactRule { filename: "package-lock.json", ecosystem: Ecosystem::Npm, kind: ManifestKind::Lockfile, confidence: 0.95, validator: always_valid },
    ExactRule { filename: "yarn.lock", ecosystem: Ecosystem::Npm, kind: ManifestKind::Lockfile, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "pnpm-lock.yaml", ecosystem: Ecosystem::Npm, kind: ManifestKind::Lockfile, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "requirements.txt", ecosystem: Ecosystem::Pypi, kind: ManifestKind::Manifest, confidence: 0.85, validator: always_valid },
    ExactRule { filename: "Pipfile", ecosystem: Ecosystem::Pypi, kind: ManifestKind::Manifest, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "Pipfile.lock", ecosystem: Ecosystem::Pypi, kind: ManifestKind::Lockfile, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "pyproject.toml", ecosystem: Ecosystem::Pypi, kind: ManifestKind::Manifest, confidence: 0.9, validator: validate_pyproject_toml },
    ExactRule { filename: "poetry.lock", ecosystem: Ecosystem::Pypi, kind: ManifestKind::Lockfile, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "go.mod", ecosystem: Ecosystem::Go, kind: ManifestKind::Manifest, confidence: 0.95, validator: validate_go_mod },
    ExactRule { filename: "go.sum", ecosystem: Ecosystem::Go, kind: ManifestKind::Lockfile, confidence: 0.95, validator: always_valid },
    ExactRule { filename: "Cargo.toml", ecosystem: Ecosystem::Cargo, kind: ManifestKind::Manifest, confidence: 0.95, validator: always_valid },
    ExactRule { filename: "Cargo.lock", ecosystem: Ecosystem::Cargo, kind: ManifestKind::Lockfile, confidence: 0.95, validator: always_valid },
    ExactRule { filename: "Gemfile", ecosystem: Ecosystem::Rubygems, kind: ManifestKind::Manifest, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "Gemfile.lock", ecosystem: Ecosystem::Rubygems, kind: ManifestKind::Lockfile, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "composer.json", ecosystem: Ecosystem::Packagist, kind: ManifestKind::Manifest, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "composer.lock", ecosystem: Ecosystem::Packagist, kind: ManifestKind::Lockfile, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "pubspec.yaml", ecosystem: Ecosystem::Pub, kind: ManifestKind::Manifest, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "pubspec.lock", ecosystem: Ecosystem::Pub, kind: ManifestKind::Lockfile, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "mix.exs", ecosystem: Ecosystem::Hex, kind: ManifestKind::Manifest, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "mix.lock", ecosystem: Ecosystem::Hex, kind: ManifestKind::Lockfile, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "pom.xml", ecosystem: Ecosystem::Maven, kind: ManifestKind::Manifest, confidence: 0.9, validator: always_valid },
    ExactRule { filename: "Package.swift", ecosystem: Ecosystem::Swift, kind: ManifestKind::Manifest, confidence: 0.9, validator: always_valid },
];

struct PatternRule {
    regex: &'static Lazy<Regex>,
    ecosystem: Ecosystem,
    kind: ManifestKind,
    confidence: f64,
}

static CSPROJ: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.(csproj|fsproj|vbproj)$").unwrap());
static NUSPEC: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.nuspec$").unwrap());
static CABAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.cabal$").unwrap());
static SLN_SUFFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\.sln$").unwrap());
static SLN_PROJECT_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^Project\([^)]*\)\s*=\s*"([^"]+)"\s*,\s*"([^"]+)""#).unwrap());

fn pattern_rules() -> Vec<PatternRule> {
    vec![
        PatternRule { regex: &CSPROJ, ecosystem: Ecosystem::Nuget, kind: ManifestKind::Manifest, confidence: 0.85 },
        PatternRule { regex: &NUSPEC, ecosystem: Ecosystem::Nuget, kind: ManifestKind::Manifest, confidence: 0.85 },
        PatternRule { regex: &CABAL, ecosystem: Ecosystem::Hackage, kind: ManifestKind::Manifest, confidence: 0.85 },
    ]
}

/// Classify `path` as a `Manifest` if its filename matches a known pattern
/// and (for exact-filename rules) its content passes the ecosystem
/// validator. Pattern-based filenames (`*.csproj`, ...) are not validated
/// (§4.3).
pub fn classify(path: &Path, content: &str) -> Option<Manifest> {
    let filename = path.file_name()?.to_str()?;

    for rule in EXACT_RULES {
        if rule.filename == filename && (rule.validator)(content) {
            return Some(build(path, filename, rule.ecosystem, rule.kind, rule.confidence));
        }
    }

    for rule in pattern_rules() {
        if rule.regex.is_match(filename) {
            return Some(build(path, filename, rule.ecosystem, rule.kind, rule.confidence));
        }
    }

    None
}

fn build(
    path: &Path,
    filename: &str,
    ecosystem: Ecosystem,
    kind: ManifestKind,
    confidence: f64,
) -> Manifest {
    Manifest {
        path: path.to_path_buf(),
        filename: filename.to_string(),
        ecosystem,
        kind,
        directory: path.parent().map(|p| p.to_path_buf()).unwrap_or_default(),
        confidence,
    }
}

/// A discovered workspace reference, e.g. an npm `workspaces` glob or a
/// Cargo `[workspace] members` entry (§4.3). Consumers expand globs
/// themselves.
#[derive(Debug, Clone)]
pub struct WorkspaceRef {
    pub pattern: String,
    pub source: String,
    pub ecosystem: Ecosystem,
}

/// Best-effort workspace detection across the ecosystems the registry
/// knows about. `filename` and `content` are a single file at a time; call
/// once per candidate file encountered during the walk.
pub fn detect_workspace(filename: &str, content: &str) -> Vec<WorkspaceRef> {
    let mut out = Vec::new();

    if filename == "package.json" {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(content) {
            if let Some(workspaces) = map.get("workspaces") {
                let patterns: Vec<String> = match workspaces {
                    serde_json::Value::Array(arr) => arr
                        .iter()
                        .filter_map(|v| v.as_str().map(|s| s.to_string()))
                        .collect(),
                    serde_json::Value::Object(o) => o
                        .get("packages")
                        .and_then(|v| v.as_array())
                        .map(|arr| {
                            arr.iter()
                                .filter_map(|v| v.as_str().map(|s| s.to_string()))
                                .collect()
                        })
                        .unwrap_or_default(),
                    _ => Vec::new(),
                };
                for pattern in patterns {
                    out.push(WorkspaceRef {
                        pattern,
                        source: "package.json#workspaces".to_string(),
                        ecosystem: Ecosystem::Npm,
                    });
                }
            }
        }
    }

    if filename == "pnpm-workspace.yaml" {
        for line in content.lines() {
            let trimmed = line.trim_start().trim_start_matches('-').trim();
            if trimmed.is_empty() || trimmed.ends_with(':') {
                continue;
            }
            out.push(WorkspaceRef {
                pattern: trimmed.trim_matches('\'').trim_matches('"').to_string(),
                source: "pnpm-workspace.yaml".to_string(),
                ecosystem: Ecosystem::Npm,
            });
        }
    }

    if filename == "lerna.json" {
        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str(content) {
            if let Some(serde_json::Value::Array(packages)) = map.get("packages") {
                for pkg in packages.iter().filter_map(|v| v.as_str()) {
                    out.push(WorkspaceRef {
                        pattern: pkg.to_string(),
                        source: "lerna.json".to_string(),
                        ecosystem: Ecosystem::Npm,
                    });
                }
            }
        }
    }

    if filename == "Cargo.toml" {
        if let Ok(value) = content.parse::<toml::Value>() {
            if let Some(members) = value
                .get("workspace")
                .and_then(|w| w.get("members"))
                .and_then(|m| m.as_array())
            {
                for m in members.iter().filter_map(|v| v.as_str()) {
                    out.push(WorkspaceRef {
                        pattern: m.to_string(),
                        source: "Cargo.toml#workspace.members".to_string(),
                        ecosystem: Ecosystem::Cargo,
                    });
                }
            }
        }
    }

    if filename == "go.work" {
        let mut in_use_block = false;
        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("use (") {
                in_use_block = true;
                continue;
            }
            if in_use_block && trimmed == ")" {
                in_use_block = false;
                continue;
            }
            if in_use_block {
                out.push(WorkspaceRef {
                    pattern: trimmed.to_string(),
                    source: "go.work#use".to_string(),
                    ecosystem: Ecosystem::Go,
                });
            } else if let Some(rest) = trimmed.strip_prefix("use ") {
                out.push(WorkspaceRef {
                    pattern: rest.trim().to_string(),
                    source: "go.work#use".to_string(),
                    ecosystem: Ecosystem::Go,
                });
            }
        }
    }

    if SLN_SUFFIX.is_match(filename) {
        for caps in SLN_PROJECT_REF.captures_iter(content) {
            out.push(WorkspaceRef {
                pattern: caps[2].to_string(),
                source: format!("{filename}#Project"),
                ecosystem: Ecosystem::Nuget,
            });
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn package_json_requires_dependencies_field() {
        let bad = classify(Path::new("package.json"), r#"{"name":"x"}"#);
        assert!(bad.is_none());

        let good = classify(Path::new("package.json"), r#"{"name":"x","dependencies":{}}"#);
        assert!(good.is_some());
        assert_eq!(good.unwrap().ecosystem, Ecosystem::Npm);
    }

    #[test]
    fn go_mod_requires_module_directive() {
        let bad = classify(Path::new("go.mod"), "require foo v1.0.0");
        assert!(bad.is_none());

        let good = classify(Path::new("go.mod"), "module example.com/app\n\ngo 1.21\n");
        assert!(good.is_some());
    }

    #[test]
    fn pyproject_requires_a_dependencies_table() {
        let bad = classify(Path::new("pyproject.toml"), "[build-system]\n");
        assert!(bad.is_none());

        let good = classify(
            Path::new("pyproject.toml"),
            "[tool.poetry.dependencies]\npython = \"^3.11\"\n",
        );
        assert!(good.is_some());
    }

    #[test]
    fn csproj_is_pattern_matched_without_content_validation() {
        let m = classify(Path::new("App.csproj"), "").unwrap();
        assert_eq!(m.ecosystem, Ecosystem::Nuget);
    }

    #[test]
    fn npm_workspaces_are_detected() {
        let refs = detect_workspace("package.json", r#"{"workspaces":["packages/*"]}"#);
        assert_eq!(refs.len(), 1);
        assert_eq!(refs[0].pattern, "packages/*");
    }

    #[test]
    fn cargo_workspace_members_are_detected() {
        let refs = detect_workspace(
            "Cargo.toml",
            "[workspace]\nmembers = [\"crates/a\", \"crates/b\"]\n",
        );
        assert_eq!(refs.len(), 2);
    }

    #[test]
    fn sln_project_references_are_detected() {
        let content = concat!(
            "Microsoft Visual Studio Solution File, Format Version 12.00\n",
            "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Api\", \"src\\Api\\Api.csproj\", \"{11111111-1111-1111-1111-111111111111}\"\n",
            "EndProject\n",
            "Project(\"{FAE04EC0-301F-11D3-BF4B-00C04F79EFBC}\") = \"Core\", \"src\\Core\\Core.csproj\", \"{22222222-2222-2222-2222-222222222222}\"\n",
            "EndProject\n",
        );
        let refs = detect_workspace("App.sln", content);
        assert_eq!(refs.len(), 2);
        assert!(refs.iter().any(|r| r.pattern == "src\\Api\\Api.csproj"));
        assert_eq!(refs[0].ecosystem, Ecosystem::Nuget);
    }
}
