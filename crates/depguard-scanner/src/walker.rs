//! Path Walker (§4.1): depth-first traversal with depth limits, directory
//! excludes, pattern excludes, and a hidden-file policy that differs between
//! source discovery and manifest discovery.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "dist",
    "build",
    "target",
    "out",
    "bin",
    "obj",
    ".next",
    ".nuxt",
    "coverage",
    "__pycache__",
    ".pytest_cache",
    ".tox",
    "venv",
    "env",
    ".venv",
    "vendor",
];

static EXCLUDE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\btest\b|\bfixtures?\b|\bmocks?\b|\.test\.|\.spec\.|\.min\.)").unwrap()
});

#[derive(Debug, Clone)]
pub struct WalkerConfig {
    pub max_depth: usize,
    pub follow_symlinks: bool,
    /// Manifest discovery doesn't special-case hidden files/dirs (§4.1); set
    /// `false` when walking for manifests, `true` when walking for source.
    pub skip_hidden: bool,
    /// Apply the test/fixture/mock/min pattern exclude. Manifests generally
    /// want this off too (a `package.json` under `test/` is still real),
    /// source scans want it on.
    pub apply_pattern_excludes: bool,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            follow_symlinks: false,
            skip_hidden: true,
            apply_pattern_excludes: true,
        }
    }
}

pub struct PathWalker {
    config: WalkerConfig,
}

impl PathWalker {
    pub fn new(config: WalkerConfig) -> Self {
        Self { config }
    }

    /// Lazily enumerate absolute file paths under `root`. Never panics or
    /// propagates an error: unreadable entries are silently skipped and
    /// produce zero output for their subtree (§4.1 "Failure").
    pub fn walk(&self, root: &Path) -> impl Iterator<Item = PathBuf> + '_ {
        WalkDir::new(root)
            .max_depth(self.config.max_depth)
            .follow_links(self.config.follow_symlinks)
            .into_iter()
            .filter_entry(move |entry| !self.should_prune_dir(entry.path()))
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| entry.into_path())
            .filter(move |path| self.accepts_file(path))
    }

    fn should_prune_dir(&self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        if !path.is_dir() {
            return false;
        }
        if EXCLUDED_DIRS.contains(&name) {
            return true;
        }
        false
    }

    fn accepts_file(&self, path: &Path) -> bool {
        if self.config.skip_hidden {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                if name.starts_with('.') {
                    return false;
                }
            }
        }
        if self.config.apply_pattern_excludes {
            let path_str = path.to_string_lossy();
            if EXCLUDE_PATTERN.is_match(&path_str) {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn skips_excluded_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("node_modules/pkg")).unwrap();
        fs::write(dir.path().join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(dir.path().join("index.js"), "x").unwrap();

        let walker = PathWalker::new(WalkerConfig::default());
        let files: Vec<_> = walker.walk(dir.path()).collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("index.js"));
    }

    #[test]
    fn skips_hidden_files_for_source_discovery() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".env"), "SECRET=1").unwrap();
        fs::write(dir.path().join("main.js"), "x").unwrap();

        let walker = PathWalker::new(WalkerConfig::default());
        let files: Vec<_> = walker.walk(dir.path()).collect();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn manifest_discovery_does_not_special_case_hidden() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join(".config")).unwrap();
        fs::write(dir.path().join(".config/package.json"), "{}").unwrap();

        let config = WalkerConfig {
            skip_hidden: false,
            apply_pattern_excludes: false,
            ..Default::default()
        };
        let walker = PathWalker::new(config);
        let files: Vec<_> = walker.walk(dir.path()).collect();

        assert_eq!(files.len(), 1);
    }

    #[test]
    fn excludes_test_and_spec_files_by_pattern() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("app.test.js"), "x").unwrap();
        fs::write(dir.path().join("app.js"), "x").unwrap();

        let walker = PathWalker::new(WalkerConfig::default());
        let files: Vec<_> = walker.walk(dir.path()).collect();

        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("app.js"));
    }

    #[test]
    fn respects_max_depth() {
        let dir = TempDir::new().unwrap();
        let deep = dir.path().join("a/b/c/d/e/f/g/h/i/j/k");
        fs::create_dir_all(&deep).unwrap();
        fs::write(deep.join("deep.js"), "x").unwrap();
        fs::write(dir.path().join("shallow.js"), "x").unwrap();

        let config = WalkerConfig {
            max_depth: 2,
            ..Default::default()
        };
        let walker = PathWalker::new(config);
        let files: Vec<_> = walker.walk(dir.path()).collect();

        assert!(files.iter().any(|f| f.ends_with("shallow.js")));
        assert!(!files.iter().any(|f| f.ends_with("deep.js")));
    }
}
