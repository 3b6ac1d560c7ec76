//! Seven-phase scan orchestrator (§4.8): manifest discovery, dependency
//! extraction, advisory matching, source walk, entry-point registration,
//! reachability/taint analysis, and ranking. Each phase tolerates component
//! failure and continues (§7); the scan as a whole only aborts on the
//! "no manifests found" boundary case (§8).

pub mod advisory_batch;
mod call_graph;
pub mod ecosystem_parser;
pub mod pipeline;
pub mod transitive_resolver;

pub use advisory_batch::{query_advisories, PackageQuery};
pub use ecosystem_parser::{EcosystemParser, EcosystemParserRegistry};
pub use pipeline::{scan_project, OrchestratorConfig, ScanResult};
pub use transitive_resolver::{TransitiveResolver, TransitiveResolverRegistry};
