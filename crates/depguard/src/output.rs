//! Minimal text-table rendering. Report rendering is explicitly out of
//! scope; this exists to make a scan result readable from a terminal, not
//! to be a reporting surface.

use colored::Colorize;
use depguard_core::Severity;
use depguard_orchestrator::ScanResult;

fn severity_colored(severity: Severity) -> String {
    let text = format!("{severity:?}").to_uppercase();
    match severity {
        Severity::Critical => text.red().bold().to_string(),
        Severity::High => text.yellow().bold().to_string(),
        Severity::Medium => text.cyan().to_string(),
        Severity::Low | Severity::Unknown => text.white().to_string(),
    }
}

pub fn print_table(result: &ScanResult) {
    println!(
        "scanned {} manifest(s), {} dependenc{}",
        result.manifests_found,
        result.dependencies_found,
        if result.dependencies_found == 1 { "y" } else { "ies" }
    );

    if result.findings.is_empty() {
        println!("{}", "no advisories matched the dependency set".green());
    } else {
        println!(
            "{:<28} {:<18} {:<10} {:<11} {:<10}",
            "PACKAGE", "ADVISORY", "SEVERITY", "REACHABLE", "CONFIDENCE"
        );
        for finding in &result.findings {
            let reachable = if finding.is_reachable {
                "yes".red().to_string()
            } else {
                "no".green().to_string()
            };
            println!(
                "{:<28} {:<18} {:<19} {:<20} {:<10.2}",
                finding.package,
                finding.advisory.id,
                severity_colored(finding.advisory.severity),
                reachable,
                finding.confidence,
            );
        }
    }

    if !result.typosquats.is_empty() {
        println!();
        println!("{}", "possible typosquats:".yellow().bold());
        for t in &result.typosquats {
            println!(
                "  {} looks like {} (similarity {:.2}, {:?})",
                t.package_name, t.similar_to, t.similarity, t.threat_level
            );
        }
    }
}

/// True when the scan found at least one reachable critical/high finding
/// (§6 exit code 1).
pub fn has_reachable_critical_or_high(result: &ScanResult) -> bool {
    result.findings.iter().any(|f| {
        f.is_reachable && matches!(f.advisory.severity, Severity::Critical | Severity::High)
    })
}
