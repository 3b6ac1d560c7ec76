//! Ecosystem identifiers shared by the manifest registry, dependency model,
//! and advisory matcher.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Npm,
    Pypi,
    Maven,
    Go,
    Cargo,
    Rubygems,
    Packagist,
    Nuget,
    Pub,
    Swift,
    Hex,
    Hackage,
}

impl fmt::Display for Ecosystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Ecosystem::Npm => "npm",
            Ecosystem::Pypi => "pypi",
            Ecosystem::Maven => "maven",
            Ecosystem::Go => "go",
            Ecosystem::Cargo => "cargo",
            Ecosystem::Rubygems => "rubygems",
            Ecosystem::Packagist => "packagist",
            Ecosystem::Nuget => "nuget",
            Ecosystem::Pub => "pub",
            Ecosystem::Swift => "swift",
            Ecosystem::Hex => "hex",
            Ecosystem::Hackage => "hackage",
        };
        f.write_str(s)
    }
}

/// Normalize a dependency name the way each ecosystem's own import syntax
/// would (§3, round-trip laws in §8):
/// - JS subpath imports collapse to the package root: `lodash/merge` → `lodash`.
/// - Scoped packages keep exactly two segments: `@scope/pkg/sub` → `@scope/pkg`.
/// - Rust crate names normalize underscores to hyphens: `foo_bar` → `foo-bar`.
pub fn normalize_name(ecosystem: Ecosystem, raw: &str) -> String {
    match ecosystem {
        Ecosystem::Npm => normalize_npm_name(raw),
        Ecosystem::Cargo => raw.replace('_', "-"),
        _ => raw.to_string(),
    }
}

fn normalize_npm_name(raw: &str) -> String {
    if let Some(rest) = raw.strip_prefix('@') {
        // Scoped: "@scope/pkg[/sub...]" -> "@scope/pkg"
        let mut parts = rest.splitn(3, '/');
        let scope = parts.next().unwrap_or("");
        let pkg = parts.next();
        match pkg {
            Some(pkg) => format!("@{scope}/{pkg}"),
            None => format!("@{scope}"),
        }
    } else {
        // Unscoped: "lodash/merge" -> "lodash"
        raw.split('/').next().unwrap_or(raw).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn npm_subpath_normalizes_to_root() {
        assert_eq!(normalize_name(Ecosystem::Npm, "lodash/merge"), "lodash");
    }

    #[test]
    fn npm_scoped_subpath_keeps_two_segments() {
        assert_eq!(normalize_name(Ecosystem::Npm, "@s/p/sub"), "@s/p");
    }

    #[test]
    fn cargo_name_replaces_underscore_with_hyphen() {
        assert_eq!(normalize_name(Ecosystem::Cargo, "foo_bar"), "foo-bar");
    }

    #[test]
    fn npm_plain_name_is_unchanged() {
        assert_eq!(normalize_name(Ecosystem::Npm, "react"), "react");
    }
}
