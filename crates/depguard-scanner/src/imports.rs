//! Import Scanner (§4.2): purely regex-driven, per-language extraction of
//! imported package names, plus the conditional-import and
//! dangerous-pattern catalogs that feed reachability strategies S2-S4 and
//! the taint-flow engine's sink detection.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    JavaScript,
    Python,
    Java,
    Go,
    Rust,
    Ruby,
    Php,
    CSharp,
    Dart,
    Elixir,
    Haskell,
}

impl Language {
    /// Best-effort guess from a file extension. Unknown extensions return
    /// `None`; callers skip scanning those files.
    pub fn from_extension(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?;
        Some(match ext {
            "js" | "jsx" | "ts" | "tsx" | "mjs" | "cjs" => Language::JavaScript,
            "py" => Language::Python,
            "java" => Language::Java,
            "go" => Language::Go,
            "rs" => Language::Rust,
            "rb" => Language::Ruby,
            "php" => Language::Php,
            "cs" => Language::CSharp,
            "dart" => Language::Dart,
            "ex" | "exs" => Language::Elixir,
            "hs" => Language::Haskell,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportType {
    Static,
    Conditional,
}

#[derive(Debug, Clone)]
pub struct ImportMatch {
    pub package: String,
    pub statement: String,
    pub language: Language,
    pub file: PathBuf,
    pub offset: usize,
    pub confidence: f64,
    pub import_type: ImportType,
}

/// Drop confidence for a line that looks commented out (§4.2). This is a
/// cheap single-line heuristic, not a real comment parser.
fn looks_commented(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("//") || trimmed.starts_with('#') || trimmed.starts_with("--")
}

fn line_start_offsets(content: &str) -> Vec<usize> {
    let mut offsets = vec![0];
    for (i, c) in content.char_indices() {
        if c == '\n' {
            offsets.push(i + 1);
        }
    }
    offsets
}

fn line_containing(offsets: &[usize], pos: usize) -> usize {
    match offsets.binary_search(&pos) {
        Ok(i) => i,
        Err(i) => i.saturating_sub(1),
    }
}

macro_rules! lazy_regex {
    ($name:ident, $pat:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).unwrap());
    };
}

// --- JS/TS ---------------------------------------------------------------
lazy_regex!(JS_REQUIRE, r#"require\(\s*['"]([^'"]+)['"]\s*\)"#);
lazy_regex!(JS_IMPORT_FROM, r#"import\s+(?:[\w*{}\s,]+)\s+from\s+['"]([^'"]+)['"]"#);
lazy_regex!(JS_IMPORT_BARE, r#"import\s+['"]([^'"]+)['"]"#);
lazy_regex!(JS_IMPORT_DYNAMIC, r#"import\(\s*['"]([^'"]+)['"]\s*\)"#);

// --- Python ----------------------------------------------------------------
lazy_regex!(PY_IMPORT, r#"(?m)^\s*import\s+([\w\.]+)"#);
lazy_regex!(PY_FROM_IMPORT, r#"(?m)^\s*from\s+([\w\.]+)\s+import"#);
lazy_regex!(PY_IMPORT_AS, r#"(?m)^\s*import\s+([\w\.]+)\s+as\s+\w+"#);

// --- Java --------------------------------------------------------------
lazy_regex!(JAVA_IMPORT, r#"import\s+([\w\.]+(?:\.\w+)*)\s*;"#);
lazy_regex!(JAVA_IMPORT_STATIC, r#"import\s+static\s+([\w\.]+(?:\.\w+)*)\s*;"#);

// --- Go ------------------------------------------------------------------
lazy_regex!(GO_QUOTED_IMPORT, r#""([\w\.\-/]+)""#);

// --- Rust ------------------------------------------------------------------
lazy_regex!(RUST_EXTERN_CRATE, r#"extern\s+crate\s+(\w+)\s*;"#);
lazy_regex!(RUST_USE, r#"use\s+(\w+)::"#);

// --- Ruby --------------------------------------------------------------
lazy_regex!(RUBY_REQUIRE, r#"require\s+['"]([^'"]+)['"]"#);
lazy_regex!(RUBY_REQUIRE_RELATIVE, r#"require_relative\s+['"]([^'"]+)['"]"#);
lazy_regex!(RUBY_GEM, r#"gem\s+['"]([^'"]+)['"]"#);

// --- PHP ---------------------------------------------------------------
lazy_regex!(PHP_USE, r#"use\s+([\w\\]+)\s*;"#);
lazy_regex!(PHP_REQUIRE, r#"require(?:_once)?\s*\(?\s*['"]([^'"]*[\w\-]+[^'"]*)['"]"#);

// --- C# ------------------------------------------------------------------
lazy_regex!(CSHARP_USING, r#"using\s+([\w\.]+)\s*;"#);
lazy_regex!(CSHARP_USING_STATIC, r#"using\s+static\s+([\w\.]+)\s*;"#);
lazy_regex!(CSHARP_USING_ALIAS, r#"using\s+\w+\s*=\s*([\w\.]+)\s*;"#);

// --- Dart ----------------------------------------------------------------
lazy_regex!(DART_IMPORT, r#"import\s+['"]package:([\w\.\-]+)/"#);

// --- Elixir --------------------------------------------------------------
lazy_regex!(ELIXIR_DEP, r#"\{:(\w+),"#);

const RUST_STDLIB: &[&str] = &["std", "core", "alloc", "self", "super", "crate"];

/// Escape `package` before using it in a regex, per §4.2.
pub fn escape_package(package: &str) -> String {
    regex::escape(package)
}

fn push_match(
    out: &mut Vec<ImportMatch>,
    content: &str,
    offsets: &[usize],
    language: Language,
    file: &Path,
    package: String,
    offset: usize,
    mut confidence: f64,
) {
    let line_idx = line_containing(offsets, offset);
    let line_text = content.lines().nth(line_idx).unwrap_or("");
    if looks_commented(line_text) {
        confidence = 0.2;
    }
    out.push(ImportMatch {
        package,
        statement: line_text.trim().to_string(),
        language,
        file: file.to_path_buf(),
        offset,
        confidence,
        import_type: ImportType::Static,
    });
}

/// Scan `content` (from `file`) for static imports in `language` (§4.2).
pub fn scan_imports(content: &str, language: Language, file: &Path) -> Vec<ImportMatch> {
    let offsets = line_start_offsets(content);
    let mut out = Vec::new();

    match language {
        Language::JavaScript => scan_js(content, &offsets, file, &mut out),
        Language::Python => scan_python(content, &offsets, file, &mut out),
        Language::Java => scan_java(content, &offsets, file, &mut out),
        Language::Go => scan_go(content, &offsets, file, &mut out),
        Language::Rust => scan_rust(content, &offsets, file, &mut out),
        Language::Ruby => scan_ruby(content, &offsets, file, &mut out),
        Language::Php => scan_php(content, &offsets, file, &mut out),
        Language::CSharp => scan_csharp(content, &offsets, file, &mut out),
        Language::Dart => scan_dart(content, &offsets, file, &mut out),
        Language::Elixir => scan_elixir(content, &offsets, file, &mut out),
        Language::Haskell => {}
    }

    out
}

fn is_relative_path(pkg: &str) -> bool {
    pkg.starts_with('.') || pkg.starts_with('/')
}

/// Relative import specifiers `scan_imports` discards (§4.2 only reports
/// package names). The orchestrator's call-graph builder resolves these
/// against sibling files to add same-project call edges.
pub fn scan_relative_imports(content: &str, language: Language) -> Vec<String> {
    let mut out = Vec::new();
    match language {
        Language::JavaScript => {
            for caps in JS_IMPORT_FROM.captures_iter(content) {
                let spec = &caps[1];
                if is_relative_path(spec) {
                    out.push(spec.to_string());
                }
            }
            for caps in JS_REQUIRE.captures_iter(content) {
                let spec = &caps[1];
                if is_relative_path(spec) {
                    out.push(spec.to_string());
                }
            }
        }
        Language::Python => {
            for caps in PY_FROM_IMPORT.captures_iter(content) {
                let spec = &caps[1];
                if spec.starts_with('.') {
                    out.push(spec.to_string());
                }
            }
        }
        _ => {}
    }
    out
}

fn scan_js(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in JS_IMPORT_FROM.captures_iter(content) {
        let pkg = &caps[1];
        if is_relative_path(pkg) {
            continue;
        }
        push_match(out, content, offsets, Language::JavaScript, file, pkg.to_string(), caps.get(1).unwrap().start(), 0.95);
    }
    for caps in JS_REQUIRE.captures_iter(content) {
        let pkg = &caps[1];
        if is_relative_path(pkg) {
            continue;
        }
        push_match(out, content, offsets, Language::JavaScript, file, pkg.to_string(), caps.get(1).unwrap().start(), 0.9);
    }
    for caps in JS_IMPORT_BARE.captures_iter(content) {
        let pkg = &caps[1];
        if is_relative_path(pkg) {
            continue;
        }
        push_match(out, content, offsets, Language::JavaScript, file, pkg.to_string(), caps.get(1).unwrap().start(), 0.8);
    }
    for caps in JS_IMPORT_DYNAMIC.captures_iter(content) {
        let pkg = &caps[1];
        if is_relative_path(pkg) {
            continue;
        }
        push_match(out, content, offsets, Language::JavaScript, file, pkg.to_string(), caps.get(1).unwrap().start(), 0.8);
    }
}

fn scan_python(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in PY_FROM_IMPORT.captures_iter(content) {
        let pkg = top_level_module(&caps[1]);
        push_match(out, content, offsets, Language::Python, file, pkg, caps.get(1).unwrap().start(), 0.95);
    }
    for caps in PY_IMPORT_AS.captures_iter(content) {
        let pkg = top_level_module(&caps[1]);
        push_match(out, content, offsets, Language::Python, file, pkg, caps.get(1).unwrap().start(), 0.9);
    }
    for caps in PY_IMPORT.captures_iter(content) {
        let pkg = top_level_module(&caps[1]);
        push_match(out, content, offsets, Language::Python, file, pkg, caps.get(1).unwrap().start(), 0.85);
    }
}

fn top_level_module(dotted: &str) -> String {
    dotted.split('.').next().unwrap_or(dotted).to_string()
}

fn scan_java(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in JAVA_IMPORT_STATIC.captures_iter(content) {
        push_match(out, content, offsets, Language::Java, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.9);
    }
    for caps in JAVA_IMPORT.captures_iter(content) {
        push_match(out, content, offsets, Language::Java, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.9);
    }
}

fn scan_go(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    let mut in_import_block = false;
    for (line_no, line) in content.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.starts_with("import (") {
            in_import_block = true;
            continue;
        }
        if in_import_block && trimmed == ")" {
            in_import_block = false;
            continue;
        }
        let on_import_line = trimmed.starts_with("import ");
        if !in_import_block && !on_import_line {
            continue;
        }
        for caps in GO_QUOTED_IMPORT.captures_iter(line) {
            let pkg = &caps[1];
            // Strings without '.' are stdlib (§4.2), omitted.
            if !pkg.contains('.') {
                continue;
            }
            let offset = offsets.get(line_no).copied().unwrap_or(0) + caps.get(1).unwrap().start();
            push_match(out, content, offsets, Language::Go, file, pkg.to_string(), offset, 0.9);
        }
    }
}

fn scan_rust(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in RUST_EXTERN_CRATE.captures_iter(content) {
        let name = caps[1].replace('_', "-");
        if RUST_STDLIB.contains(&caps[1].as_str()) {
            continue;
        }
        push_match(out, content, offsets, Language::Rust, file, name, caps.get(1).unwrap().start(), 0.98);
    }
    for caps in RUST_USE.captures_iter(content) {
        if RUST_STDLIB.contains(&caps[1].as_str()) {
            continue;
        }
        let name = caps[1].replace('_', "-");
        push_match(out, content, offsets, Language::Rust, file, name, caps.get(1).unwrap().start(), 0.85);
    }
}

fn scan_ruby(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in RUBY_GEM.captures_iter(content) {
        push_match(out, content, offsets, Language::Ruby, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.9);
    }
    for caps in RUBY_REQUIRE_RELATIVE.captures_iter(content) {
        push_match(out, content, offsets, Language::Ruby, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.5);
    }
    for caps in RUBY_REQUIRE.captures_iter(content) {
        let pkg = &caps[1];
        if is_relative_path(pkg) {
            continue;
        }
        push_match(out, content, offsets, Language::Ruby, file, pkg.to_string(), caps.get(1).unwrap().start(), 0.85);
    }
}

fn scan_php(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in PHP_USE.captures_iter(content) {
        push_match(out, content, offsets, Language::Php, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.9);
    }
    for caps in PHP_REQUIRE.captures_iter(content) {
        push_match(out, content, offsets, Language::Php, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.6);
    }
}

fn scan_csharp(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in CSHARP_USING_STATIC.captures_iter(content) {
        push_match(out, content, offsets, Language::CSharp, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.85);
    }
    for caps in CSHARP_USING_ALIAS.captures_iter(content) {
        push_match(out, content, offsets, Language::CSharp, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.8);
    }
    for caps in CSHARP_USING.captures_iter(content) {
        push_match(out, content, offsets, Language::CSharp, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.9);
    }
}

fn scan_dart(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in DART_IMPORT.captures_iter(content) {
        push_match(out, content, offsets, Language::Dart, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.9);
    }
}

fn scan_elixir(content: &str, offsets: &[usize], file: &Path, out: &mut Vec<ImportMatch>) {
    for caps in ELIXIR_DEP.captures_iter(content) {
        push_match(out, content, offsets, Language::Elixir, file, caps[1].to_string(), caps.get(1).unwrap().start(), 0.7);
    }
}

// --- Conditional imports -----------------------------------------------

lazy_regex!(
    JS_TRY_REQUIRE,
    r#"try\s*\{[^}]*require\(\s*['"]([^'"]+)['"]\s*\)"#
);
lazy_regex!(
    JS_IF_REQUIRE,
    r#"if\s*\([^)]*\)\s*\{[^}]*require\(\s*['"]([^'"]+)['"]\s*\)"#
);
lazy_regex!(
    JS_TERNARY_REQUIRE,
    r#"\?\s*require\(\s*['"]([^'"]+)['"]\s*\)\s*:\s*require\(\s*['"]([^'"]+)['"]\s*\)"#
);
lazy_regex!(
    PY_TRY_IMPORT,
    r#"(?m)try:\s*\n\s*import\s+([\w\.]+)"#
);
lazy_regex!(
    PY_IF_IMPORT,
    r#"(?m)if\s+[^:]+:\s*\n\s*import\s+([\w\.]+)"#
);

/// Separate extractor for guarded/lazy imports (§4.2): confidence
/// 0.50-0.65, tagged `ImportType::Conditional`.
pub fn scan_conditional_imports(content: &str, language: Language, file: &Path) -> Vec<ImportMatch> {
    let offsets = line_start_offsets(content);
    let mut out = Vec::new();

    let mut push = |pkg: String, offset: usize, confidence: f64| {
        out.push(ImportMatch {
            package: pkg,
            statement: content.lines().nth(line_containing(&offsets, offset)).unwrap_or("").trim().to_string(),
            language,
            file: file.to_path_buf(),
            offset,
            confidence,
            import_type: ImportType::Conditional,
        });
    };

    match language {
        Language::JavaScript => {
            for caps in JS_TRY_REQUIRE.captures_iter(content) {
                push(caps[1].to_string(), caps.get(1).unwrap().start(), 0.6);
            }
            for caps in JS_IF_REQUIRE.captures_iter(content) {
                push(caps[1].to_string(), caps.get(1).unwrap().start(), 0.55);
            }
            for caps in JS_TERNARY_REQUIRE.captures_iter(content) {
                push(caps[1].to_string(), caps.get(1).unwrap().start(), 0.5);
                push(caps[2].to_string(), caps.get(2).unwrap().start(), 0.5);
            }
        }
        Language::Python => {
            for caps in PY_TRY_IMPORT.captures_iter(content) {
                push(top_level_module(&caps[1]), caps.get(1).unwrap().start(), 0.65);
            }
            for caps in PY_IF_IMPORT.captures_iter(content) {
                push(top_level_module(&caps[1]), caps.get(1).unwrap().start(), 0.55);
            }
        }
        _ => {}
    }

    out
}

// --- Dangerous-pattern catalog -------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DangerousPatternKind {
    PrototypePollution,
    CommandInjection,
    SqlInjection,
    PathTraversal,
    UnsafeDeserialization,
    Ssrf,
    Redos,
    HardcodedSecret,
    UnsafeHtmlRendering,
    WeakCrypto,
    TlsValidationDisabled,
}

impl DangerousPatternKind {
    pub fn severity(self) -> depguard_core::Severity {
        use depguard_core::Severity::*;
        match self {
            DangerousPatternKind::CommandInjection => Critical,
            DangerousPatternKind::SqlInjection => Critical,
            DangerousPatternKind::UnsafeDeserialization => Critical,
            DangerousPatternKind::Ssrf => High,
            DangerousPatternKind::PathTraversal => High,
            DangerousPatternKind::PrototypePollution => High,
            DangerousPatternKind::TlsValidationDisabled => High,
            DangerousPatternKind::HardcodedSecret => High,
            DangerousPatternKind::UnsafeHtmlRendering => Medium,
            DangerousPatternKind::Redos => Medium,
            DangerousPatternKind::WeakCrypto => Medium,
        }
    }
}

#[derive(Debug, Clone)]
pub struct DangerousMatch {
    pub kind: DangerousPatternKind,
    pub file: PathBuf,
    pub line: usize,
    pub confidence: f64,
    pub snippet: String,
}

lazy_regex!(
    PROTOTYPE_POLLUTION,
    r#"(?:merge|extend|assign)\s*\(\s*\{?\s*\}?\s*,\s*(?:req\.(?:body|query|params))"#
);
lazy_regex!(
    COMMAND_INJECTION,
    r#"(?:exec|spawn|execFile)\s*\([^)]*(?:\+|\$\{|req\.)"#
);
lazy_regex!(
    SQL_INJECTION,
    r#"(?:query|execute|raw)\s*\([^)]*(?:\+|\$\{|format!|%s)"#
);
lazy_regex!(
    PATH_TRAVERSAL,
    r#"(?:readFile|open|File\.read|fs\.readFile)\w*\([^)]*(?:req\.|params\[|\.\.)"#
);
lazy_regex!(
    UNSAFE_DESERIALIZATION,
    r#"\b(?:eval|new\s+Function|yaml\.load|pickle\.loads|unserialize)\s*\("#
);
lazy_regex!(
    SSRF,
    r#"(?:axios|fetch|requests\.get|http\.get|urlopen)\s*\([^)]*req\."#
);
lazy_regex!(REDOS, r#"new\s+RegExp\s*\(\s*req\."#);
lazy_regex!(
    HARDCODED_SECRET,
    r#"(?i)(password|secret|api_key|token)\s*[:=]\s*['"][^'"]{8,}['"]"#
);
lazy_regex!(
    UNSAFE_HTML,
    r#"(?:innerHTML\s*=|dangerouslySetInnerHTML|v-html|document\.write\s*\()"#
);
lazy_regex!(WEAK_CRYPTO, r#"\b(?:md5|sha1)\s*\("#);
lazy_regex!(
    TLS_DISABLED,
    r#"(?:rejectUnauthorized\s*:\s*false|verify\s*=\s*False|InsecureSkipVerify\s*:\s*true)"#
);

/// Scan for the fixed security-sink catalog (§4.2). Each match carries a
/// line number, confidence 0.80, and severity.
pub fn scan_dangerous_patterns(content: &str, file: &Path) -> Vec<DangerousMatch> {
    let mut out = Vec::new();
    let checks: &[(DangerousPatternKind, &Lazy<Regex>)] = &[
        (DangerousPatternKind::PrototypePollution, &PROTOTYPE_POLLUTION),
        (DangerousPatternKind::CommandInjection, &COMMAND_INJECTION),
        (DangerousPatternKind::SqlInjection, &SQL_INJECTION),
        (DangerousPatternKind::PathTraversal, &PATH_TRAVERSAL),
        (DangerousPatternKind::UnsafeDeserialization, &UNSAFE_DESERIALIZATION),
        (DangerousPatternKind::Ssrf, &SSRF),
        (DangerousPatternKind::Redos, &REDOS),
        (DangerousPatternKind::HardcodedSecret, &HARDCODED_SECRET),
        (DangerousPatternKind::UnsafeHtmlRendering, &UNSAFE_HTML),
        (DangerousPatternKind::WeakCrypto, &WEAK_CRYPTO),
        (DangerousPatternKind::TlsValidationDisabled, &TLS_DISABLED),
    ];

    for (line_no, line) in content.lines().enumerate() {
        for (kind, regex) in checks {
            if regex.is_match(line) {
                out.push(DangerousMatch {
                    kind: *kind,
                    file: file.to_path_buf(),
                    line: line_no + 1,
                    confidence: 0.80,
                    snippet: line.trim().to_string(),
                });
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn js_require_is_detected_with_high_confidence() {
        let content = "const _ = require('lodash');";
        let matches = scan_imports(content, Language::JavaScript, Path::new("index.js"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].package, "lodash");
        assert_eq!(matches[0].confidence, 0.9);
    }

    #[test]
    fn js_relative_require_produces_no_match() {
        let content = "const x = require('./local');";
        let matches = scan_imports(content, Language::JavaScript, Path::new("index.js"));
        assert!(matches.is_empty());
    }

    #[test]
    fn js_import_from_has_highest_confidence() {
        let content = "import _ from 'lodash';";
        let matches = scan_imports(content, Language::JavaScript, Path::new("index.js"));
        assert_eq!(matches[0].confidence, 0.95);
    }

    #[test]
    fn commented_import_drops_confidence() {
        let content = "// const _ = require('lodash');";
        let matches = scan_imports(content, Language::JavaScript, Path::new("index.js"));
        assert_eq!(matches[0].confidence, 0.2);
    }

    #[test]
    fn python_from_import_has_highest_confidence() {
        let content = "from yaml import load";
        let matches = scan_imports(content, Language::Python, Path::new("service.py"));
        assert_eq!(matches[0].package, "yaml");
        assert_eq!(matches[0].confidence, 0.95);
    }

    #[test]
    fn rust_extern_crate_normalizes_underscore_to_hyphen() {
        let content = "extern crate serde_json;";
        let matches = scan_imports(content, Language::Rust, Path::new("main.rs"));
        assert_eq!(matches[0].package, "serde-json");
        assert_eq!(matches[0].confidence, 0.98);
    }

    #[test]
    fn rust_stdlib_uses_are_excluded() {
        let content = "use std::collections::HashMap; use core::fmt;";
        let matches = scan_imports(content, Language::Rust, Path::new("main.rs"));
        assert!(matches.is_empty());
    }

    #[test]
    fn go_stdlib_strings_without_dot_are_omitted() {
        let content = "import (\n\t\"fmt\"\n\t\"github.com/gin-gonic/gin\"\n)";
        let matches = scan_imports(content, Language::Go, Path::new("main.go"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].package, "github.com/gin-gonic/gin");
    }

    #[test]
    fn conditional_require_is_tagged_and_lower_confidence() {
        let content = "try { require('optional-dep') } catch (e) {}";
        let matches = scan_conditional_imports(content, Language::JavaScript, Path::new("a.js"));
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].import_type, ImportType::Conditional);
        assert!(matches[0].confidence >= 0.5 && matches[0].confidence <= 0.65);
    }

    #[test]
    fn dangerous_command_injection_is_flagged() {
        let content = "exec('rm -rf ' + req.query.path);";
        let matches = scan_dangerous_patterns(content, Path::new("handler.js"));
        assert!(matches.iter().any(|m| m.kind == DangerousPatternKind::CommandInjection));
        assert_eq!(matches[0].confidence, 0.80);
    }

    #[test]
    fn dangerous_yaml_load_is_unsafe_deserialization() {
        let content = "data = yaml.load(request.data)";
        let matches = scan_dangerous_patterns(content, Path::new("service.py"));
        assert!(matches
            .iter()
            .any(|m| m.kind == DangerousPatternKind::UnsafeDeserialization));
    }

    #[test]
    fn escape_package_neutralizes_regex_metacharacters() {
        let escaped = escape_package("c++");
        assert_eq!(escaped, r"c\+\+");
    }

    #[test]
    fn scan_relative_imports_keeps_what_scan_imports_discards() {
        let content = "const utils = require('./utils');\nconst _ = require('lodash');";
        let relative = scan_relative_imports(content, Language::JavaScript);
        assert_eq!(relative, vec!["./utils".to_string()]);
    }

    #[test]
    fn scan_relative_imports_handles_python_dotted_specifiers() {
        let content = "from .helpers import load\n";
        let relative = scan_relative_imports(content, Language::Python);
        assert_eq!(relative, vec![".helpers".to_string()]);
    }
}
