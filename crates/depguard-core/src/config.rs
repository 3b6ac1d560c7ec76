use serde::{Deserialize, Serialize};

/// Scan configuration (§6). Loadable from TOML or JSON; every field has the
/// default named in the spec.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub max_depth: usize,
    pub min_confidence: f64,
    pub include_indirect_paths: bool,
    pub use_import_heuristics: bool,
    pub use_pattern_matching: bool,
    pub use_transitive_imports: bool,
    pub track_dynamic_calls: bool,
    pub only_reachable: bool,
    pub format: String,
    pub verbosity: u8,
    /// Subprocess/network timeout, seconds (§5: subprocess default 60s,
    /// network 15-30s; this is the caller-facing knob, strategies apply
    /// their own narrower defaults where the spec calls for them).
    pub timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_confidence: 0.5,
            include_indirect_paths: true,
            use_import_heuristics: true,
            use_pattern_matching: true,
            use_transitive_imports: true,
            track_dynamic_calls: true,
            only_reachable: false,
            format: "table".to_string(),
            verbosity: 1,
            timeout: 60,
        }
    }
}

impl Config {
    pub fn from_json_str(s: &str) -> Result<Self, crate::error::DepGuardError> {
        serde_json::from_str(s).map_err(|e| crate::error::DepGuardError::ValidationError {
            details: format!("invalid config JSON: {e}"),
        })
    }

    pub fn from_toml_str(s: &str) -> Result<Self, crate::error::DepGuardError> {
        toml::from_str(s).map_err(|e| crate::error::DepGuardError::ValidationError {
            details: format!("invalid config TOML: {e}"),
        })
    }

    /// Load from `path`, dispatching on extension (`.json` vs `.toml`); any
    /// other extension is treated as TOML, matching the teacher's
    /// `toml`-first config convention.
    pub fn from_file(path: &std::path::Path) -> Result<Self, crate::error::DepGuardError> {
        let content = std::fs::read_to_string(path).map_err(|e| crate::error::DepGuardError::FileSystemError {
            path: path.display().to_string(),
            details: e.to_string(),
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let c = Config::default();
        assert_eq!(c.max_depth, 10);
        assert_eq!(c.min_confidence, 0.5);
        assert!(c.include_indirect_paths);
        assert_eq!(c.timeout, 60);
    }

    #[test]
    fn roundtrips_through_json() {
        let c = Config::default();
        let json = serde_json::to_string(&c).unwrap();
        let back = Config::from_json_str(&json).unwrap();
        assert_eq!(back.max_depth, c.max_depth);
    }
}
