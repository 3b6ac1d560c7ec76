//! Directed multigraph of `(file, function)` nodes for reachability analysis
//! (§3, §4.5). The graph exclusively owns node and edge storage; entry-point
//! and vulnerable-location sets elsewhere hold only string keys into it
//! (§9 "Graph ownership").

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::Path;

/// How a call edge was discovered. Confidence is fixed per type (§3):
/// `Direct`/`DirectMethod` are certain static calls, `Dynamic` covers
/// reflection/higher-order dispatch the scanner can only infer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallType {
    Direct,
    Dynamic,
    DirectMethod,
}

impl CallType {
    pub fn base_confidence(self) -> f64 {
        match self {
            CallType::Direct => 1.0,
            CallType::Dynamic => 0.7,
            CallType::DirectMethod => 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub target: String,
    pub call_type: CallType,
    pub confidence: f64,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GraphStatistics {
    pub node_count: usize,
    pub edge_count: usize,
    pub entry_point_count: usize,
    pub vulnerability_count: usize,
}

/// Build a `"file:function"` node key. Callers should route name
/// construction through here so graph keys and entry-point keys never
/// drift apart (§3: "key... must match graph node format").
pub fn node_key(file: &Path, function: &str) -> String {
    format!("{}:{}", file.display(), function)
}

#[derive(Debug, Default)]
pub struct CallGraph {
    nodes: HashSet<String>,
    forward: HashMap<String, Vec<Edge>>,
    reverse: HashMap<String, Vec<Edge>>,
    entry_points: HashSet<String>,
    vulnerable_nodes: HashSet<String>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_node(&mut self, key: &str) {
        if self.nodes.insert(key.to_string()) {
            self.forward.entry(key.to_string()).or_default();
            self.reverse.entry(key.to_string()).or_default();
        }
    }

    /// `add-entry-point(file, function)` (§4.5).
    pub fn add_entry_point(&mut self, file: &Path, function: &str) {
        let key = node_key(file, function);
        self.ensure_node(&key);
        self.entry_points.insert(key);
    }

    pub fn add_entry_point_key(&mut self, key: &str) {
        self.ensure_node(key);
        self.entry_points.insert(key.to_string());
    }

    /// `add-call(from-file, from-fn, to-file, to-fn, type)` (§4.5). Adds a
    /// forward edge and its symmetric reverse edge (invariant 1, §8). Adding
    /// the same call twice produces two edges (round-trip law, §8) but
    /// cannot shorten the shortest path, since BFS revisitation is keyed on
    /// node identity, not edge identity.
    pub fn add_call(
        &mut self,
        from_file: &Path,
        from_fn: &str,
        to_file: &Path,
        to_fn: &str,
        call_type: CallType,
    ) {
        let from = node_key(from_file, from_fn);
        let to = node_key(to_file, to_fn);
        self.add_call_by_key(&from, &to, call_type);
    }

    pub fn add_call_by_key(&mut self, from: &str, to: &str, call_type: CallType) {
        self.ensure_node(from);
        self.ensure_node(to);
        let confidence = call_type.base_confidence();
        self.forward.entry(from.to_string()).or_default().push(Edge {
            target: to.to_string(),
            call_type,
            confidence,
        });
        self.reverse.entry(to.to_string()).or_default().push(Edge {
            target: from.to_string(),
            call_type,
            confidence,
        });
    }

    /// `add-vulnerability(pkg, file, fn, advisory)` (§4.5). The graph only
    /// needs the location's node key to scope BFS targets; the package and
    /// advisory payload live in the `VulnerableLocation` record the caller
    /// already holds.
    pub fn add_vulnerability(&mut self, file: &Path, function: &str) -> String {
        let key = node_key(file, function);
        self.ensure_node(&key);
        self.vulnerable_nodes.insert(key.clone());
        key
    }

    pub fn forward_edges(&self, key: &str) -> &[Edge] {
        self.forward.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn reverse_edges(&self, key: &str) -> &[Edge] {
        self.reverse.get(key).map(|v| v.as_slice()).unwrap_or(&[])
    }

    pub fn has_node(&self, key: &str) -> bool {
        self.nodes.contains(key)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    pub fn entry_points(&self) -> impl Iterator<Item = &String> {
        self.entry_points.iter()
    }

    pub fn get_statistics(&self) -> GraphStatistics {
        GraphStatistics {
            node_count: self.nodes.len(),
            edge_count: self.forward.values().map(|v| v.len()).sum(),
            entry_point_count: self.entry_points.len(),
            vulnerability_count: self.vulnerable_nodes.len(),
        }
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.forward.clear();
        self.reverse.clear();
        self.entry_points.clear();
        self.vulnerable_nodes.clear();
    }

    /// BFS from every entry point, depth-capped, guarding against cycles
    /// and pathological fan-out (§4.5). Returns the set of node keys
    /// visited; callers extract file paths from the `file:function` keys.
    pub fn reachable_nodes(&self, max_depth: usize) -> HashSet<String> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();

        for ep in &self.entry_points {
            if visited.insert(ep.clone()) {
                queue.push_back((ep.clone(), 0));
            }
        }

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge in self.forward_edges(&node) {
                if visited.insert(edge.target.clone()) {
                    queue.push_back((edge.target.clone(), depth + 1));
                }
            }
        }

        visited
    }

    /// The set of distinct source files touched by `reachable_nodes`,
    /// consumed by reachability strategies S2-S4 to scope their file scans.
    pub fn reachable_files(&self, max_depth: usize) -> HashSet<String> {
        self.reachable_nodes(max_depth)
            .into_iter()
            .filter_map(|key| key.rsplit_once(':').map(|(file, _)| file.to_string()))
            .collect()
    }

    /// Shortest forward path from `start` to `goal`, with per-edge
    /// confidences, via BFS with a `(node, depth)` visit key bounded by
    /// `max_depth` (§4.6 strategy S1). `None` if unreachable within the
    /// depth cap.
    pub fn shortest_path(
        &self,
        start: &str,
        goal: &str,
        max_depth: usize,
    ) -> Option<(Vec<String>, Vec<f64>)> {
        if start == goal {
            return Some((vec![start.to_string()], Vec::new()));
        }

        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        let mut parent: HashMap<String, (String, f64)> = HashMap::new();

        visited.insert(start.to_string());
        queue.push_back((start.to_string(), 0));

        while let Some((node, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }
            for edge in self.forward_edges(&node) {
                if visited.insert(edge.target.clone()) {
                    parent.insert(edge.target.clone(), (node.clone(), edge.confidence));
                    if edge.target == goal {
                        return Some(reconstruct(&parent, start, goal));
                    }
                    queue.push_back((edge.target.clone(), depth + 1));
                }
            }
        }

        None
    }

    /// Backward BFS from `goal` toward any entry point (§4.6 S1 "indirect
    /// paths"). Returns the path oriented entry-point -> ... -> goal, same
    /// shape as `shortest_path`, so callers can treat both uniformly.
    pub fn shortest_path_to_any_entry_point(
        &self,
        goal: &str,
        max_depth: usize,
    ) -> Option<(Vec<String>, Vec<f64>)> {
        let mut visited: HashSet<String> = HashSet::new();
        let mut queue: VecDeque<(String, usize)> = VecDeque::new();
        let mut parent: HashMap<String, (String, f64)> = HashMap::new();

        visited.insert(goal.to_string());
        queue.push_back((goal.to_string(), 0));

        while let Some((node, depth)) = queue.pop_front() {
            if self.entry_points.contains(&node) {
                let (mut path, mut confs) = reconstruct(&parent, goal, &node);
                path.reverse();
                confs.reverse();
                return Some((path, confs));
            }
            if depth >= max_depth {
                continue;
            }
            for edge in self.reverse_edges(&node) {
                if visited.insert(edge.target.clone()) {
                    parent.insert(edge.target.clone(), (node.clone(), edge.confidence));
                    queue.push_back((edge.target.clone(), depth + 1));
                }
            }
        }

        None
    }
}

fn reconstruct(
    parent: &HashMap<String, (String, f64)>,
    start: &str,
    goal: &str,
) -> (Vec<String>, Vec<f64>) {
    let mut path = vec![goal.to_string()];
    let mut confs = Vec::new();
    let mut current = goal.to_string();

    while current != start {
        let (prev, conf) = parent.get(&current).expect("parent chain must reach start");
        confs.push(*conf);
        path.push(prev.clone());
        current = prev.clone();
    }

    path.reverse();
    confs.reverse();
    (path, confs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn every_forward_edge_has_a_reverse_edge() {
        let mut g = CallGraph::new();
        g.add_call(&p("a.js"), "f", &p("b.js"), "g", CallType::Direct);

        let from = node_key(&p("a.js"), "f");
        let to = node_key(&p("b.js"), "g");

        assert_eq!(g.forward_edges(&from)[0].target, to);
        assert_eq!(g.reverse_edges(&to)[0].target, from);
        assert_eq!(g.forward_edges(&from)[0].confidence, 1.0);
        assert_eq!(g.reverse_edges(&to)[0].confidence, 1.0);
    }

    #[test]
    fn duplicate_calls_add_two_edges_same_shortest_path() {
        let mut g = CallGraph::new();
        g.add_call(&p("a.js"), "f", &p("b.js"), "g", CallType::Direct);
        g.add_call(&p("a.js"), "f", &p("b.js"), "g", CallType::Direct);

        let from = node_key(&p("a.js"), "f");
        let to = node_key(&p("b.js"), "g");
        assert_eq!(g.forward_edges(&from).len(), 2);

        let (path, _) = g.shortest_path(&from, &to, 10).unwrap();
        assert_eq!(path.len(), 2);
    }

    #[test]
    fn bfs_terminates_on_a_cycle() {
        let mut g = CallGraph::new();
        g.add_call(&p("a.js"), "f", &p("b.js"), "g", CallType::Direct);
        g.add_call(&p("b.js"), "g", &p("a.js"), "f", CallType::Direct);

        let from = node_key(&p("a.js"), "f");
        g.add_entry_point(&p("a.js"), "f");

        let reachable = g.reachable_nodes(100);
        assert!(reachable.contains(&from));
        assert_eq!(reachable.len(), 2);
    }

    #[test]
    fn clear_resets_everything() {
        let mut g = CallGraph::new();
        g.add_call(&p("a.js"), "f", &p("b.js"), "g", CallType::Direct);
        g.add_entry_point(&p("a.js"), "f");
        g.clear();

        let stats = g.get_statistics();
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.edge_count, 0);
        assert_eq!(stats.entry_point_count, 0);
        assert_eq!(stats.vulnerability_count, 0);
    }

    #[test]
    fn reachable_files_scopes_to_entry_point_subgraph() {
        let mut g = CallGraph::new();
        g.add_entry_point(&p("main.js"), "main");
        g.add_call(&p("main.js"), "main", &p("lib.js"), "helper", CallType::Direct);

        let files = g.reachable_files(10);
        assert!(files.contains("main.js"));
        assert!(files.contains("lib.js"));
        assert!(!files.contains("unrelated.js"));
    }
}
