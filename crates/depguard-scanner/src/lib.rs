//! Path Walker, Import Scanner, and Manifest Registry (§4.1-§4.3).
//!
//! These three leaf components feed the entry-point detector and
//! reachability engine in `depguard-reachability`; none of them know
//! anything about call graphs or taint.

pub mod functions;
pub mod imports;
pub mod manifest_registry;
pub mod walker;

pub use functions::{contains_call_site, scan_function_declarations};
pub use imports::{
    escape_package, scan_conditional_imports, scan_dangerous_patterns, scan_imports,
    scan_relative_imports, DangerousMatch, DangerousPatternKind, ImportMatch, ImportType, Language,
};
pub use manifest_registry::{classify, detect_workspace, WorkspaceRef};
pub use walker::{PathWalker, WalkerConfig};
