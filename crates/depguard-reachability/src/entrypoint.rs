//! Entry-Point Detector (§4.4): scores each source file against a catalog
//! of framework/language signals and keeps the ones whose aggregate
//! confidence clears the threshold.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SignalType {
    HttpHandler,
    MainFunction,
    CliCommand,
    EventHandler,
    PackageExport,
    ServerInit,
    NoIncomingCalls,
    TestFile,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Signal {
    pub signal_type: SignalType,
    /// Always positive; `TestFile` is the one negative signal and is
    /// subtracted rather than encoded as a negative number.
    pub strength: f64,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryPoint {
    pub file: PathBuf,
    pub function: String,
    pub primary_signal: SignalType,
    pub confidence: f64,
    pub signals: Vec<Signal>,
}

impl EntryPoint {
    fn recompute(&mut self) {
        let positives: Vec<&Signal> = self
            .signals
            .iter()
            .filter(|s| !matches!(s.signal_type, SignalType::TestFile | SignalType::NoIncomingCalls))
            .collect();
        if positives.is_empty() {
            self.confidence = 0.0;
            return;
        }

        let mean = positives.iter().map(|s| s.strength).sum::<f64>() / positives.len() as f64;
        let mut score = mean;

        let strong_count = positives.iter().filter(|s| s.strength > 0.8).count();
        if strong_count >= 2 {
            score = (score + 0.1_f64).min(1.0);
        }

        // NoIncomingCalls (§4.4 "NO_CALLERS: ... -> +0.3") is a flat bonus on
        // top of the averaged signal score, not another value folded into
        // the mean.
        if let Some(no_callers) = self
            .signals
            .iter()
            .find(|s| s.signal_type == SignalType::NoIncomingCalls)
        {
            score = (score + no_callers.strength).min(1.0);
        }

        if let Some(negative) = self
            .signals
            .iter()
            .find(|s| s.signal_type == SignalType::TestFile)
        {
            score = (score - negative.strength).max(0.0);
        }

        self.primary_signal = positives
            .iter()
            .max_by(|a, b| a.strength.partial_cmp(&b.strength).unwrap())
            .map(|s| s.signal_type)
            .unwrap_or(SignalType::HttpHandler);
        self.confidence = score;
    }
}

macro_rules! lazy_regex {
    ($name:ident, $pat:expr) => {
        static $name: Lazy<Regex> = Lazy::new(|| Regex::new($pat).unwrap());
    };
}

// --- HTTP handler signals -------------------------------------------------
lazy_regex!(EXPRESS_ROUTE, r#"(?:app|router)\.(?:get|post|put|delete|patch|use)\s*\("#);
lazy_regex!(
    NEXTJS_ROUTE_EXPORT,
    r#"(?m)^export\s+(?:async\s+)?function\s+(?:GET|POST|PUT|DELETE|PATCH)\s*\("#
);
lazy_regex!(FLASK_ROUTE, r#"@app\.route\s*\("#);
lazy_regex!(FASTAPI_ROUTE, r#"@\w+\.(?:get|post|put|delete|patch)\s*\("#);
lazy_regex!(SPRING_MAPPING, r#"@(?:Get|Post|Put|Delete|Patch|Request)Mapping"#);
lazy_regex!(GIN_ECHO_ROUTE, r#"\b\w+\.(?:GET|POST|PUT|DELETE|PATCH)\s*\("#);
lazy_regex!(FASTIFY_ROUTE, r#"fastify\.(?:get|post|put|delete)\s*\("#);
lazy_regex!(HAPI_ROUTE, r#"server\.route\s*\("#);
lazy_regex!(LARAVEL_ROUTE, r#"Route::(?:get|post|put|delete|patch)\s*\("#);
lazy_regex!(RAILS_ROUTE, r#"resources\s+:\w+|get\s+['"]\S+['"]\s*,\s*to:"#);
lazy_regex!(SINATRA_ROUTE, r#"^\s*(?:get|post|put|delete)\s+['"]"#);
lazy_regex!(ASPNET_ROUTE, r#"\[Http(?:Get|Post|Put|Delete|Patch)\]|Map(?:Get|Post|Put|Delete)\s*\("#);
lazy_regex!(ACTIX_ROUTE, r#"web::(?:get|post|put|delete)\s*\(\)\.to\s*\("#);

// --- Main-function signals -------------------------------------------------
lazy_regex!(PY_MAIN_GUARD, r#"if\s+__name__\s*==\s*['"]__main__['"]"#);
lazy_regex!(JAVA_MAIN, r#"public\s+static\s+void\s+main\s*\("#);
lazy_regex!(RUST_GO_MAIN, r#"(?m)^\s*fn\s+main\s*\(|^func\s+main\s*\("#);
lazy_regex!(C_MAIN, r#"\bint\s+main\s*\("#);
lazy_regex!(NODE_CJS_MAIN, r#"require\.main\s*===\s*module"#);
lazy_regex!(NODE_ESM_MAIN, r#"import\.meta\.url\s*==="#);
lazy_regex!(RUBY_MAIN, r#"if\s+__FILE__\s*==\s*\$0"#);
lazy_regex!(DOTNET_MAIN, r#"static\s+(?:void|int|async\s+Task)\s+Main\s*\("#);

// --- CLI command signals ----------------------------------------------------
lazy_regex!(COMMANDER_JS, r#"new\s+Command\s*\(\)|program\.command\s*\("#);
lazy_regex!(YARGS, r#"\byargs\s*\("#);
lazy_regex!(CLICK, r#"@click\.command\s*\("#);
lazy_regex!(ARGPARSE, r#"argparse\.ArgumentParser\s*\("#);
lazy_regex!(COBRA, r#"cobra\.Command\s*\{|\.Execute\s*\(\s*\)"#);
lazy_regex!(CLAP, r#"#\[derive\([^)]*Parser[^)]*\)\]|clap::Parser"#);

// --- Event-handler signals --------------------------------------------------
lazy_regex!(EVENT_EMITTER, r#"\.(?:on|addListener)\s*\(\s*['"]"#);
lazy_regex!(MQ_LISTENER, r#"@(?:RabbitListener|KafkaListener|SqsListener|EventListener)"#);
lazy_regex!(SUBSCRIBE_CONSUME, r#"\.(?:subscribe|consume)\s*\("#);
lazy_regex!(GRAPHQL_RESOLVER, r#"@(?:Resolver|Query|Mutation)\s*\("#);

// --- Server-init signals ----------------------------------------------------
lazy_regex!(NODE_LISTEN, r#"\.listen\s*\("#);
lazy_regex!(PYTHON_RUN_HOST, r#"\.run\s*\(\s*host\s*="#);
lazy_regex!(SPRING_BOOT_APP, r#"@SpringBootApplication"#);
lazy_regex!(GO_LISTEN_SERVE, r#"http\.ListenAndServe\s*\("#);

fn scan(regexes: &[(&Lazy<Regex>, f64, &str)], content: &str, signal_type: SignalType, out: &mut Vec<Signal>) {
    for (re, confidence, reason) in regexes {
        if re.is_match(content) {
            out.push(Signal {
                signal_type,
                strength: *confidence,
                reason: reason.to_string(),
            });
            return;
        }
    }
}

/// Test-file path heuristics (§4.4): the one negative signal.
fn looks_like_test_file(path: &Path) -> bool {
    let s = path.to_string_lossy();
    s.contains("/test/")
        || s.contains("/tests/")
        || s.contains("/spec/")
        || s.contains("__tests__")
        || s.ends_with(".test.js")
        || s.ends_with(".test.ts")
        || s.ends_with(".spec.js")
        || s.ends_with(".spec.ts")
        || s.contains("_test.py")
        || s.contains("test_")
        || s.ends_with("Test.java")
        || s.ends_with("_test.go")
}

/// Score one file. `is_package_entry` comes from cross-referencing the
/// manifest registry's `main`/`bin` fields (§4.4 `PackageExport`); `false`
/// when the caller has no manifest to check against.
pub fn detect(file: &Path, content: &str, is_package_entry: bool) -> Option<EntryPoint> {
    let mut signals = Vec::new();

    scan(
        &[
            (&EXPRESS_ROUTE, 0.85, "express-style route registration"),
            (&NEXTJS_ROUTE_EXPORT, 0.90, "next.js app-router handler export"),
            (&FLASK_ROUTE, 0.90, "flask route decorator"),
            (&FASTAPI_ROUTE, 0.90, "fastapi route decorator"),
            (&SPRING_MAPPING, 0.90, "spring mvc mapping annotation"),
            (&GIN_ECHO_ROUTE, 0.80, "gin/echo route registration"),
            (&FASTIFY_ROUTE, 0.85, "fastify route registration"),
            (&HAPI_ROUTE, 0.80, "hapi route registration"),
            (&LARAVEL_ROUTE, 0.90, "laravel route facade"),
            (&RAILS_ROUTE, 0.60, "rails routes.rb entry"),
            (&SINATRA_ROUTE, 0.75, "sinatra route block"),
            (&ASPNET_ROUTE, 0.90, "asp.net core route attribute"),
            (&ACTIX_ROUTE, 0.85, "actix-web route registration"),
        ],
        content,
        SignalType::HttpHandler,
        &mut signals,
    );

    scan(
        &[
            (&PY_MAIN_GUARD, 1.0, "python __main__ guard"),
            (&JAVA_MAIN, 0.95, "java public static void main"),
            (&RUST_GO_MAIN, 0.90, "rust/go fn main"),
            (&C_MAIN, 0.90, "c/c++ int main"),
            (&NODE_CJS_MAIN, 0.90, "commonjs require.main check"),
            (&NODE_ESM_MAIN, 0.85, "esm import.meta.url check"),
            (&RUBY_MAIN, 0.90, "ruby __FILE__ guard"),
            (&DOTNET_MAIN, 0.85, "dotnet static Main"),
        ],
        content,
        SignalType::MainFunction,
        &mut signals,
    );

    scan(
        &[
            (&COMMANDER_JS, 0.80, "commander.js cli definition"),
            (&YARGS, 0.75, "yargs cli definition"),
            (&CLICK, 0.85, "click command decorator"),
            (&ARGPARSE, 0.80, "argparse cli definition"),
            (&COBRA, 0.75, "cobra command definition"),
            (&CLAP, 0.80, "clap derive parser"),
        ],
        content,
        SignalType::CliCommand,
        &mut signals,
    );

    scan(
        &[
            (&MQ_LISTENER, 0.90, "message-queue listener annotation"),
            (&GRAPHQL_RESOLVER, 0.80, "graphql resolver annotation"),
            (&SUBSCRIBE_CONSUME, 0.65, "subscribe/consume call"),
            (&EVENT_EMITTER, 0.60, "event emitter listener registration"),
        ],
        content,
        SignalType::EventHandler,
        &mut signals,
    );

    scan(
        &[
            (&SPRING_BOOT_APP, 0.90, "spring boot application entrypoint"),
            (&NODE_LISTEN, 0.85, "http server listen call"),
            (&PYTHON_RUN_HOST, 0.80, "wsgi/asgi run(host=...) call"),
            (&GO_LISTEN_SERVE, 0.85, "go http.ListenAndServe call"),
        ],
        content,
        SignalType::ServerInit,
        &mut signals,
    );

    if is_package_entry {
        signals.push(Signal {
            signal_type: SignalType::PackageExport,
            strength: 0.75,
            reason: "file is the manifest's declared entry point".to_string(),
        });
    }

    if looks_like_test_file(file) {
        signals.push(Signal {
            signal_type: SignalType::TestFile,
            strength: 0.8,
            reason: "path matches test-file conventions".to_string(),
        });
    }

    if signals.iter().all(|s| s.signal_type == SignalType::TestFile) {
        return None;
    }

    let function = signals
        .iter()
        .find(|s| s.signal_type == SignalType::MainFunction)
        .map(|_| "main".to_string())
        .unwrap_or_else(|| "module".to_string());

    let mut entry = EntryPoint {
        file: file.to_path_buf(),
        function,
        primary_signal: SignalType::HttpHandler,
        confidence: 0.0,
        signals,
    };
    entry.recompute();

    if entry.confidence <= 0.0 {
        return None;
    }
    Some(entry)
}

/// Applied once the call graph exists (§4.4 `NoIncomingCalls`): a file with
/// signals but no incoming call-graph edges is more likely a real entry
/// point than a dead code path, so it gets a confidence bump.
pub fn apply_no_callers_signal(entry: &mut EntryPoint, has_incoming_edges: bool) {
    if has_incoming_edges {
        return;
    }
    entry.signals.push(Signal {
        signal_type: SignalType::NoIncomingCalls,
        strength: 0.3,
        reason: "no incoming call-graph edges".to_string(),
    });
    entry.recompute();
}

pub fn passes_threshold(entry: &EntryPoint, min_confidence: f64) -> bool {
    entry.confidence >= min_confidence
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn express_route_is_detected_as_http_handler() {
        let content = "app.get('/users', (req, res) => { res.send(users) });";
        let entry = detect(Path::new("routes.js"), content, false).unwrap();
        assert_eq!(entry.primary_signal, SignalType::HttpHandler);
        assert!(entry.confidence > 0.5);
    }

    #[test]
    fn python_main_guard_is_high_confidence() {
        let content = "if __name__ == '__main__':\n    main()\n";
        let entry = detect(Path::new("app.py"), content, false).unwrap();
        assert_eq!(entry.primary_signal, SignalType::MainFunction);
        assert_eq!(entry.function, "main");
        assert!(entry.confidence >= 0.9);
    }

    #[test]
    fn test_file_signal_suppresses_an_otherwise_bare_test() {
        let content = "describe('users', () => { it('works', () => {}); });";
        let entry = detect(Path::new("src/__tests__/users.test.js"), content, false);
        assert!(entry.is_none());
    }

    #[test]
    fn test_signal_lowers_confidence_of_a_real_handler_in_a_test_dir() {
        let content = "app.get('/health', h);";
        let entry = detect(Path::new("test/fixtures/server.js"), content, false).unwrap();
        assert!(entry.confidence < 0.85);
    }

    #[test]
    fn two_strong_signals_add_a_bonus() {
        let content = "app.listen(3000);\napp.get('/', h);\n@SpringBootApplication\n";
        let entry = detect(Path::new("server.js"), content, false).unwrap();
        assert!(entry.confidence > 0.85);
    }

    #[test]
    fn no_callers_signal_boosts_confidence() {
        let content = "app.get('/x', h);";
        let mut entry = detect(Path::new("x.js"), content, false).unwrap();
        let before = entry.confidence;
        apply_no_callers_signal(&mut entry, false);
        assert!(entry.confidence >= before);
        assert!(entry.signals.iter().any(|s| s.signal_type == SignalType::NoIncomingCalls));
    }

    #[test]
    fn unrelated_file_produces_no_entry_point() {
        let content = "export const add = (a, b) => a + b;";
        assert!(detect(Path::new("math.js"), content, false).is_none());
    }
}
