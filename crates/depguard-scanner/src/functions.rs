//! Per-language function-declaration and call-site detection, feeding the
//! orchestrator's call-graph construction step (§4.8 phase 4). Like the
//! rest of this crate, purely regex-driven — no AST.

use crate::imports::escape_package;
use crate::Language;
use once_cell::sync::Lazy;
use regex::Regex;

macro_rules! lazy_regex {
    ($name:ident, $pat:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).unwrap());
    };
}

lazy_regex!(JS_FUNCTION_DECL, r#"function\s+(\w+)\s*\("#);
lazy_regex!(JS_ARROW_CONST, r#"(?:const|let|var)\s+(\w+)\s*=\s*(?:async\s*)?\([^)]*\)\s*=>"#);
lazy_regex!(PY_DEF, r#"(?m)^\s*def\s+(\w+)\s*\("#);
lazy_regex!(GO_FUNC, r#"(?m)^func\s+(?:\([^)]*\)\s*)?(\w+)\s*\("#);
lazy_regex!(RUST_FN, r#"fn\s+(\w+)\s*\("#);
lazy_regex!(JAVA_METHOD, r#"(?:public|private|protected)\s+(?:static\s+)?[\w<>\[\]]+\s+(\w+)\s*\([^;]*\)\s*\{"#);
lazy_regex!(RUBY_DEF, r#"(?m)^\s*def\s+(\w+)"#);
lazy_regex!(PHP_FUNCTION, r#"function\s+(\w+)\s*\("#);

/// Declared function/method names in `content` (§4.8 "per-language
/// call-graph construction"). Best-effort: a name appearing here is a
/// plausible call-graph node, not a verified one.
pub fn scan_function_declarations(content: &str, language: Language) -> Vec<String> {
    let regexes: &[&Lazy<Regex>] = match language {
        Language::JavaScript => &[&JS_FUNCTION_DECL, &JS_ARROW_CONST],
        Language::Python => &[&PY_DEF],
        Language::Go => &[&GO_FUNC],
        Language::Rust => &[&RUST_FN],
        Language::Java => &[&JAVA_METHOD],
        Language::Ruby => &[&RUBY_DEF],
        Language::Php => &[&PHP_FUNCTION],
        _ => &[],
    };

    let mut names = Vec::new();
    for re in regexes {
        for caps in re.captures_iter(content) {
            let name = caps[1].to_string();
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Whether `function_name` is invoked somewhere in `content` beyond its own
/// declaration. A declaration written as `function foo(` matches the call
/// pattern too, so a real call site requires more than one occurrence;
/// arrow-assigned functions (`const foo = (...) =>`) don't match `foo(` at
/// all at the declaration site, so a single occurrence there is already a
/// call. This under-counts arrow declarations with zero call sites as
/// "called" only if some other `foo(` text exists, which is the same
/// false-positive risk every regex-only scanner in this crate accepts.
pub fn contains_call_site(content: &str, function_name: &str) -> bool {
    let pattern = format!(r"\b{}\s*\(", escape_package(function_name));
    let Ok(re) = Regex::new(&pattern) else {
        return false;
    };
    re.find_iter(content).count() > 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_function_declaration_is_found() {
        let content = "function handleRequest(req, res) { respond(res); }";
        let names = scan_function_declarations(content, Language::JavaScript);
        assert!(names.contains(&"handleRequest".to_string()));
    }

    #[test]
    fn js_arrow_const_declaration_is_found() {
        let content = "const handler = (req, res) => { respond(res); };";
        let names = scan_function_declarations(content, Language::JavaScript);
        assert!(names.contains(&"handler".to_string()));
    }

    #[test]
    fn python_def_is_found() {
        let content = "def process(data):\n    return data\n";
        let names = scan_function_declarations(content, Language::Python);
        assert_eq!(names, vec!["process".to_string()]);
    }

    #[test]
    fn declared_but_uncalled_function_has_no_call_site() {
        let content = "function unused(x) { return x; }";
        assert!(!contains_call_site(content, "unused"));
    }

    #[test]
    fn declared_and_invoked_function_has_a_call_site() {
        let content = "function helper(x) { return x; }\nhelper(42);\n";
        assert!(contains_call_site(content, "helper"));
    }

    #[test]
    fn unrelated_extension_returns_no_declarations() {
        let names = scan_function_declarations("main() {}", Language::Haskell);
        assert!(names.is_empty());
    }
}
