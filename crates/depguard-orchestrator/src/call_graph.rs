//! Per-language call-graph construction (§4.8 phase 4): same-file calls
//! from the declaration/call-site scan, plus cross-file edges resolved
//! from relative imports. Third-party package resolution stays with
//! strategies S2-S4; this module only builds edges within the scanned
//! source tree.

use depguard_graph::CallType;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};

/// Collapse `.`/`..` components without touching the filesystem, so a
/// resolved relative-import path can be compared against `file_contents`
/// keys discovered by the source walker.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::ParentDir => {
                out.pop();
            }
            Component::CurDir => {}
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn resolve_js_relative(file: &Path, spec: &str) -> Vec<PathBuf> {
    let base_dir = file.parent().unwrap_or_else(|| Path::new(""));
    let joined = normalize(&base_dir.join(spec));

    let mut candidates = vec![joined.clone()];
    for ext in ["js", "jsx", "ts", "tsx", "mjs", "cjs"] {
        candidates.push(joined.with_extension(ext));
    }
    for ext in ["js", "jsx", "ts", "tsx"] {
        candidates.push(joined.join(format!("index.{ext}")));
    }
    candidates
}

fn resolve_python_relative(file: &Path, spec: &str) -> Vec<PathBuf> {
    let dots = spec.chars().take_while(|c| *c == '.').count();
    let rest = &spec[dots..];

    let mut dir = file.parent().unwrap_or_else(|| Path::new("")).to_path_buf();
    for _ in 1..dots {
        dir.pop();
    }

    if rest.is_empty() {
        return vec![dir.join("__init__.py")];
    }
    let rel = rest.replace('.', "/");
    vec![dir.join(format!("{rel}.py")), dir.join(&rel).join("__init__.py")]
}

/// Build a `CallGraph` from the already-scanned source tree: a `module ->
/// fn` edge for every declared function with a real call site in the same
/// file, and a `module -> module` edge for every relative import that
/// resolves to another file in `file_contents`.
pub(crate) fn build(file_contents: &HashMap<PathBuf, String>) -> depguard_graph::CallGraph {
    let mut graph = depguard_graph::CallGraph::new();

    for (file, content) in file_contents {
        let Some(language) = depguard_scanner::Language::from_extension(file) else {
            continue;
        };

        for name in depguard_scanner::scan_function_declarations(content, language) {
            if depguard_scanner::contains_call_site(content, &name) {
                graph.add_call(file, "module", file, &name, CallType::Direct);
            }
        }

        for spec in depguard_scanner::scan_relative_imports(content, language) {
            let candidates = match language {
                depguard_scanner::Language::JavaScript => resolve_js_relative(file, &spec),
                depguard_scanner::Language::Python => resolve_python_relative(file, &spec),
                _ => Vec::new(),
            };
            if let Some(target) = candidates.into_iter().find(|c| file_contents.contains_key(c)) {
                graph.add_call(file, "module", &target, "module", CallType::Direct);
            }
        }
    }

    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use depguard_graph::node_key;

    fn p(s: &str) -> PathBuf {
        PathBuf::from(s)
    }

    #[test]
    fn same_file_call_produces_an_edge() {
        let mut files = HashMap::new();
        files.insert(
            p("server.js"),
            "function handle(req, res) { respond(res); }\nfunction respond(res) { res.send('ok'); }".to_string(),
        );
        let graph = build(&files);

        let from = node_key(&p("server.js"), "module");
        let targets: Vec<&str> = graph.forward_edges(&from).iter().map(|e| e.target.as_str()).collect();
        assert!(targets.contains(&node_key(&p("server.js"), "respond").as_str()));
    }

    #[test]
    fn uncalled_declaration_produces_no_edge() {
        let mut files = HashMap::new();
        files.insert(p("lib.js"), "function dead(x) { return x; }".to_string());
        let graph = build(&files);

        let from = node_key(&p("lib.js"), "module");
        assert!(graph.forward_edges(&from).is_empty());
    }

    #[test]
    fn relative_require_resolves_to_sibling_file() {
        let mut files = HashMap::new();
        files.insert(p("index.js"), "const utils = require('./utils');\nutils.run();".to_string());
        files.insert(p("utils.js"), "function run() {}".to_string());
        let graph = build(&files);

        let from = node_key(&p("index.js"), "module");
        let to = node_key(&p("utils.js"), "module");
        let targets: Vec<&str> = graph.forward_edges(&from).iter().map(|e| e.target.as_str()).collect();
        assert!(targets.contains(&to.as_str()));
    }

    #[test]
    fn python_relative_import_resolves_up_one_level() {
        let mut files = HashMap::new();
        files.insert(p("pkg/api.py"), "from ..shared import helper\nhelper()".to_string());
        files.insert(p("shared.py"), "def helper():\n    pass\n".to_string());
        let graph = build(&files);

        let from = node_key(&p("pkg/api.py"), "module");
        let to = node_key(&p("shared.py"), "module");
        let targets: Vec<&str> = graph.forward_edges(&from).iter().map(|e| e.target.as_str()).collect();
        assert!(targets.contains(&to.as_str()));
    }
}
