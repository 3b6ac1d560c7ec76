//! Reachability Engine (§4.6): runs strategies S1-S4 in strict order,
//! stopping at the first one that proves reachability, with S3 additionally
//! boosting S1 when both apply.

use depguard_core::{Config, DetectionMethod, Reachability, VulnerableLocation};
use depguard_graph::CallGraph;
use depguard_scanner::{scan_conditional_imports, scan_dangerous_patterns, scan_imports, ImportMatch, Language};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub struct ReachabilityEngine<'a> {
    graph: &'a CallGraph,
    file_contents: &'a HashMap<PathBuf, String>,
    config: &'a Config,
    reachable_files: std::collections::HashSet<String>,
}

impl<'a> ReachabilityEngine<'a> {
    pub fn new(graph: &'a CallGraph, file_contents: &'a HashMap<PathBuf, String>, config: &'a Config) -> Self {
        let reachable_files = graph.reachable_files(config.max_depth);
        Self {
            graph,
            file_contents,
            config,
            reachable_files,
        }
    }

    /// Full strategy pipeline for one vulnerable location (§4.6).
    pub fn analyze(&self, location: &VulnerableLocation) -> Reachability {
        let goal = location.graph_key();

        let s1 = self.strategy_s1(&goal);
        if s1.is_reachable {
            let s3 = self.strategy_s3(&location.package, true);
            return merge_s1_s3(s1, s3);
        }

        if self.config.use_import_heuristics {
            let s2 = self.strategy_s2(&location.package);
            if s2.is_reachable {
                return s2;
            }
        }

        if self.config.use_pattern_matching {
            let s3 = self.strategy_s3(&location.package, false);
            if s3.is_reachable {
                return s3;
            }
        }

        if self.config.use_transitive_imports {
            let s4 = self.strategy_s4(&location.package);
            if s4.is_reachable {
                return s4;
            }
        }

        Reachability::unreachable()
    }

    /// S1: call-graph BFS from each known entry point to the sink (§4.6,
    /// §9 "backward-only path"). Tries genuine forward paths first; only
    /// when none exists does it fall back to the reverse-graph search,
    /// whose result is capped at 0.8 confidence per the spec's tunable
    /// default (§9 open question b).
    fn strategy_s1(&self, goal: &str) -> Reachability {
        let mut forward_best: Option<(Vec<String>, Vec<f64>)> = None;
        for entry in self.graph.entry_points() {
            if let Some(candidate) = self.graph.shortest_path(entry, goal, self.config.max_depth) {
                let better = forward_best
                    .as_ref()
                    .map(|(path, _)| candidate.0.len() < path.len())
                    .unwrap_or(true);
                if better {
                    forward_best = Some(candidate);
                }
            }
        }

        let (path, edge_confidences, capped) = match forward_best {
            Some((path, confs)) => (path, confs, false),
            None if self.config.include_indirect_paths => {
                match self.graph.shortest_path_to_any_entry_point(goal, self.config.max_depth) {
                    Some((path, confs)) => (path, confs, true),
                    None => return Reachability::unreachable(),
                }
            }
            None => return Reachability::unreachable(),
        };

        let hops = path.len().saturating_sub(1);

        // §4.6: product of edge confidences × length penalty 0.95^(nodes-1),
        // boosted ×1.1 for short (≤3 node) paths, clamped to [0, 1].
        let nodes = path.len();
        let product = edge_confidences.iter().fold(1.0_f64, |acc, c| acc * c);
        let length_penalty = 0.95_f64.powi((nodes.saturating_sub(1)) as i32);
        let mut confidence = product * length_penalty;
        if nodes <= 3 {
            confidence *= 1.1;
        }
        confidence = confidence.clamp(0.0, 1.0);
        if capped {
            confidence = confidence.min(0.8);
        }

        let is_reachable = confidence >= self.config.min_confidence;
        Reachability {
            is_reachable,
            confidence,
            shortest_path_length: hops,
            paths: if is_reachable { vec![path] } else { Vec::new() },
            detection_method: if is_reachable { DetectionMethod::CallGraph } else { DetectionMethod::None },
            detection_detail: None,
        }
    }

    /// S2: import-detection over the reachable subgraph (or the whole
    /// project when the call graph found nothing to scope to).
    fn strategy_s2(&self, package: &str) -> Reachability {
        let matches = self.find_package_imports(package, &self.candidate_files());
        if matches.is_empty() {
            return Reachability::unreachable();
        }

        let files: std::collections::HashSet<&Path> = matches.iter().map(|m| m.file.as_path()).collect();
        let num_files = files.len();
        let combined_base = (0.6 + 0.05 * (num_files.saturating_sub(1)) as f64).min(0.8);
        let mean_import_conf = matches.iter().map(|m| m.confidence).sum::<f64>() / matches.len() as f64;
        let confidence = ((combined_base + mean_import_conf * 0.9) / 2.0).min(0.85);

        let is_reachable = confidence >= self.config.min_confidence;
        let paths = files
            .into_iter()
            .take(3)
            .map(|f| vec![f.display().to_string(), format!("{package} (imported)")])
            .collect();

        Reachability {
            is_reachable,
            confidence,
            shortest_path_length: 1,
            paths: if is_reachable { paths } else { Vec::new() },
            detection_method: if is_reachable { DetectionMethod::ImportDetection } else { DetectionMethod::None },
            detection_detail: None,
        }
    }

    /// S3: dangerous-pattern matching, either standalone or (via
    /// `merge_s1_s3`) boosting an S1 result that already succeeded.
    fn strategy_s3(&self, package: &str, s1_succeeded: bool) -> Reachability {
        let candidates = self.candidate_files();
        let importing_files = self.find_package_imports(package, &candidates);
        let mut best: Option<(PathBuf, f64)> = None;

        for import in &importing_files {
            let Some(content) = self.file_contents.get(&import.file) else {
                continue;
            };
            let hits = scan_dangerous_patterns(content, &import.file);
            if hits.is_empty() {
                continue;
            }
            let in_reachable = self.reachable_files.contains(&import.file.display().to_string());
            let confidence = if in_reachable { 0.85 } else { 0.70 };
            if best.as_ref().map(|(_, c)| confidence > *c).unwrap_or(true) {
                best = Some((import.file.clone(), confidence));
            }
        }

        let Some((file, confidence)) = best else {
            return Reachability::unreachable();
        };

        if s1_succeeded {
            // Confidence is applied by the caller via `merge_s1_s3`; here we
            // only report the raw S3 evidence.
            return Reachability {
                is_reachable: true,
                confidence,
                shortest_path_length: 0,
                paths: vec![vec![file.display().to_string(), "dangerous-pattern".to_string()]],
                detection_method: DetectionMethod::PatternMatching,
                detection_detail: None,
            };
        }

        let is_reachable = confidence >= self.config.min_confidence;
        Reachability {
            is_reachable,
            confidence,
            shortest_path_length: 1,
            paths: if is_reachable {
                vec![vec![file.display().to_string(), "dangerous-pattern".to_string()]]
            } else {
                Vec::new()
            },
            detection_method: if is_reachable { DetectionMethod::PatternMatching } else { DetectionMethod::None },
            detection_detail: None,
        }
    }

    /// S4: transitive import graph, the weakest and last-resort strategy.
    fn strategy_s4(&self, package: &str) -> Reachability {
        let mut best_conf = 0.0_f64;
        let mut hit_files = Vec::new();

        for (file, content) in self.file_contents.iter() {
            if !self.reachable_files.contains(&file.display().to_string()) {
                continue;
            }
            let Some(lang) = Language::from_extension(file) else {
                continue;
            };
            let mut matches = scan_imports(content, lang, file);
            matches.extend(scan_conditional_imports(content, lang, file));

            for m in &matches {
                let conf = if m.package == package {
                    0.55
                } else if m.package.starts_with(&format!("{package}/")) || package.starts_with(&format!("{}/", m.package)) {
                    0.45
                } else {
                    continue;
                };
                best_conf = best_conf.max(conf);
                hit_files.push(file.clone());
            }
        }

        if hit_files.is_empty() {
            return Reachability::unreachable();
        }

        let is_reachable = best_conf >= self.config.min_confidence;
        let paths = hit_files
            .into_iter()
            .take(3)
            .map(|f| vec![f.display().to_string(), format!("{package} (transitive)")])
            .collect();

        Reachability {
            is_reachable,
            confidence: best_conf,
            shortest_path_length: 1,
            paths: if is_reachable { paths } else { Vec::new() },
            detection_method: if is_reachable { DetectionMethod::TransitiveImport } else { DetectionMethod::None },
            detection_detail: None,
        }
    }

    /// Files to scan for S2-S4: the reachable subgraph when the call graph
    /// produced one, else every file the caller handed us content for.
    fn candidate_files(&self) -> Vec<PathBuf> {
        if self.reachable_files.is_empty() {
            self.file_contents.keys().cloned().collect()
        } else {
            self.file_contents
                .keys()
                .filter(|f| self.reachable_files.contains(&f.display().to_string()))
                .cloned()
                .collect()
        }
    }

    fn find_package_imports(&self, package: &str, files: &[PathBuf]) -> Vec<ImportMatch> {
        let mut out = Vec::new();
        for file in files {
            let Some(content) = self.file_contents.get(file) else {
                continue;
            };
            let Some(lang) = Language::from_extension(file) else {
                continue;
            };
            out.extend(scan_imports(content, lang, file).into_iter().filter(|m| m.package == package));
            out.extend(scan_conditional_imports(content, lang, file).into_iter().filter(|m| m.package == package));
        }
        out
    }
}

fn merge_s1_s3(s1: Reachability, s3: Reachability) -> Reachability {
    if !s3.is_reachable {
        return s1;
    }
    let confidence = (s1.confidence + s3.confidence * 0.2).min(1.0);
    Reachability {
        is_reachable: true,
        confidence,
        shortest_path_length: s1.shortest_path_length,
        paths: s1.paths,
        detection_method: DetectionMethod::Composite,
        detection_detail: Some("call-graph+pattern".to_string()),
    }
}
