use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    // Ordered low-to-high so `Ord` gives a sensible ranking key.
    Unknown,
    Low,
    Medium,
    High,
    Critical,
}

/// An externally-sourced vulnerability advisory (§3). The advisory provider
/// contract (§6) is the only producer of these; this crate just defines the
/// shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advisory {
    pub id: String,
    pub package: String,
    pub affected_range: String,
    pub severity: Severity,
    pub cvss: Option<f64>,
    pub epss: Option<f64>,
    pub kev: bool,
    pub affected_function: Option<String>,
}

/// A `(package, file:function)` location at which an advisory's affected
/// code executes. `(module_path, function_name)` form the call-graph key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VulnerableLocation {
    pub package: String,
    pub module_path: String,
    pub function_name: String,
    pub advisory: Advisory,
}

impl VulnerableLocation {
    /// Graph key in `"module:function"` form, matching call-graph node ids.
    pub fn graph_key(&self) -> String {
        format!("{}:{}", self.module_path, self.function_name)
    }
}
