//! Taint-Flow Engine (§4.7): a lightweight BFS over the call graph that asks
//! whether an untrusted source can reach a sink, bounded by path length and
//! keyed on the source text of the files each node touches down to.

use depguard_core::{DataFlow, RiskLabel};
use depguard_graph::CallGraph;
use std::collections::HashMap;
use std::path::PathBuf;

const MAX_PATH_LENGTH: usize = 20;
const REQ_BODY_MARKERS: &[&str] = &["req.body", "req.query"];

struct SourcePattern {
    needle: &'static str,
    risk: RiskLabel,
}

const SOURCES: &[SourcePattern] = &[
    SourcePattern { needle: "req.body", risk: RiskLabel::High },
    SourcePattern { needle: "req.query", risk: RiskLabel::High },
    SourcePattern { needle: "req.params", risk: RiskLabel::High },
    SourcePattern { needle: "req.headers", risk: RiskLabel::Medium },
    SourcePattern { needle: "req.cookies", risk: RiskLabel::Medium },
    SourcePattern { needle: "request.form", risk: RiskLabel::High },
    SourcePattern { needle: "request.args", risk: RiskLabel::High },
    SourcePattern { needle: "process.argv", risk: RiskLabel::Medium },
    SourcePattern { needle: "process.env", risk: RiskLabel::Medium },
    SourcePattern { needle: "fs.readFile", risk: RiskLabel::Medium },
    SourcePattern { needle: "socket.on", risk: RiskLabel::Medium },
];

const SANITIZERS: &[&str] = &[
    "validator.escape",
    "validator.isEmail",
    "validator.normalizeEmail",
    "DOMPurify.sanitize",
    "sanitize-html",
    "mysql.escape",
    "pg.escape",
    "sequelize.escape",
    "path.normalize",
    "parseInt(",
    "parseFloat(",
    "encodeURIComponent(",
];

pub struct TaintFlowEngine<'a> {
    graph: &'a CallGraph,
    file_contents: &'a HashMap<PathBuf, String>,
}

struct PathEvidence {
    length: usize,
    /// Sanitizer names actually encountered walking this specific path, not
    /// a project-wide scan (§4.7 per-path evidence).
    sanitizers: Vec<&'static str>,
    has_req_body_or_query: bool,
    sources_hit: Vec<&'static str>,
}

impl<'a> TaintFlowEngine<'a> {
    pub fn new(graph: &'a CallGraph, file_contents: &'a HashMap<PathBuf, String>) -> Self {
        Self { graph, file_contents }
    }

    /// Trace flows from every source-bearing node to `sink_key`, then fold
    /// the results into a `DataFlow` verdict (§4.7).
    pub fn analyze(&self, sink_key: &str) -> DataFlow {
        let sources = self.source_nodes();
        let mut found_paths = Vec::new();

        for source_key in &sources {
            if let Some((path, _)) = self.graph.shortest_path(source_key, sink_key, MAX_PATH_LENGTH) {
                found_paths.push(self.evaluate_path(&path));
            }
        }

        let sanitizers_seen = Self::sanitizer_names(&found_paths);
        Self::fold_paths(&found_paths, &sanitizers_seen)
    }

    /// Single-file fallback for callers with no call-graph edge between the
    /// file a vulnerable usage was found in and a formal sink node — e.g. an
    /// orchestrator that located the usage via import/pattern matching
    /// rather than graph traversal. Treats the file's own content as a
    /// zero-length path: a source marker and the dangerous call are assumed
    /// colocated.
    pub fn analyze_content(&self, content: &str) -> DataFlow {
        let evidence = vec![PathEvidence {
            length: 0,
            sanitizers: SANITIZERS.iter().copied().filter(|s| content.contains(*s)).collect(),
            has_req_body_or_query: REQ_BODY_MARKERS.iter().any(|m| content.contains(m)),
            sources_hit: self.matched_sources(content).collect(),
        }];
        let sanitizers_seen = Self::sanitizer_names(&evidence);
        Self::fold_paths(&evidence.into_iter().filter(|e| !e.sources_hit.is_empty()).collect::<Vec<_>>(), &sanitizers_seen)
    }

    fn fold_paths(found_paths: &[PathEvidence], sanitizers_seen: &[String]) -> DataFlow {
        let k = found_paths.len();
        let mut union_sources: Vec<&'static str> = Vec::new();
        let mut any_sanitized = false;
        let mut any_req_body_or_query = false;
        let mut shortest = usize::MAX;

        for p in found_paths {
            shortest = shortest.min(p.length);
            any_sanitized |= !p.sanitizers.is_empty();
            any_req_body_or_query |= p.has_req_body_or_query;
            for s in &p.sources_hit {
                if !union_sources.contains(s) {
                    union_sources.push(s);
                }
            }
        }
        let sanitizers_seen: Vec<String> = if any_sanitized { sanitizers_seen.to_vec() } else { Vec::new() };

        let high_source = union_sources.iter().any(|needle| {
            SOURCES
                .iter()
                .find(|s| &s.needle == needle)
                .map(|s| s.risk == RiskLabel::High)
                .unwrap_or(false)
        });

        let confidence = if k == 0 {
            0.30
        } else {
            let mut c = 0.50;
            if k > 1 {
                c += 0.10;
            }
            if shortest <= 3 {
                c += 0.20;
            } else if shortest <= 5 {
                c += 0.10;
            }
            if any_sanitized {
                c -= 0.30;
            }
            if any_req_body_or_query {
                c += 0.15;
            }
            c.clamp(0.10, 0.98)
        };

        let risk = match (k > 0, high_source, any_sanitized) {
            (false, _, _) => RiskLabel::Low,
            (true, true, false) => RiskLabel::Critical,
            (true, true, true) => RiskLabel::High,
            (true, false, false) => RiskLabel::High,
            (true, false, true) => RiskLabel::Medium,
        };

        DataFlow {
            is_tainted: k > 0,
            confidence,
            sources: union_sources.into_iter().map(str::to_string).collect(),
            sanitizers: sanitizers_seen,
            risk,
        }
    }

    /// Merge a taint verdict onto a reachability confidence (§4.7, closing
    /// paragraph): only pulls confidence up, never down.
    pub fn merge_confidence(reachability_confidence: f64, taint: &DataFlow) -> f64 {
        if taint.confidence > 0.60 {
            (reachability_confidence + 0.4 * taint.confidence).min(0.98)
        } else {
            reachability_confidence
        }
    }

    fn source_nodes(&self) -> Vec<String> {
        self.graph
            .nodes()
            .filter(|key| self.node_file_content(key).map(|c| self.matched_sources(c).next().is_some()).unwrap_or(false))
            .cloned()
            .collect()
    }

    fn node_file_content(&self, node_key: &str) -> Option<&str> {
        let (file, _) = node_key.rsplit_once(':')?;
        self.file_contents.get(&PathBuf::from(file)).map(String::as_str)
    }

    fn matched_sources<'c>(&self, content: &'c str) -> impl Iterator<Item = &'static str> + 'c {
        SOURCES.iter().filter(move |s| content.contains(s.needle)).map(|s| s.needle)
    }

    fn evaluate_path(&self, path: &[String]) -> PathEvidence {
        let mut sanitizers = Vec::new();
        let mut has_req_body_or_query = false;
        let mut sources_hit = Vec::new();

        for node in path {
            let Some(content) = self.node_file_content(node) else {
                continue;
            };
            sources_hit.extend(self.matched_sources(content));
            for s in SANITIZERS {
                if content.contains(s) && !sanitizers.contains(s) {
                    sanitizers.push(*s);
                }
            }
            if REQ_BODY_MARKERS.iter().any(|m| content.contains(m)) {
                has_req_body_or_query = true;
            }
        }

        PathEvidence {
            length: path.len().saturating_sub(1),
            sanitizers,
            has_req_body_or_query,
            sources_hit,
        }
    }

    /// Union of sanitizer names actually seen across `paths`, preserving
    /// per-path evidence instead of re-scanning every file in the project.
    fn sanitizer_names(paths: &[PathEvidence]) -> Vec<String> {
        let mut out: Vec<String> = Vec::new();
        for p in paths {
            for s in &p.sanitizers {
                let name = s.to_string();
                if !out.contains(&name) {
                    out.push(name);
                }
            }
        }
        out
    }
}
