use clap::Parser;

use depguard::cli::Cli;
use depguard::output;
use depguard_advisories::enrichment::{epss, kev};
use depguard_advisories::StaticAdvisoryProvider;
use depguard_core::{Advisory, Config};
use depguard_orchestrator::{scan_project, EcosystemParserRegistry, OrchestratorConfig, TransitiveResolverRegistry};
use std::path::Path;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "depguard=info",
        1 => "depguard=debug",
        _ => "debug",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &cli.config {
        Some(path) => match Config::from_file(Path::new(path)) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("error loading config: {e}");
                return ExitCode::from(2);
            }
        },
        None => Config::default(),
    };
    config.only_reachable = config.only_reachable || cli.only_reachable;

    let mut advisories = match load_advisories(cli.advisories.as_deref()) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("error loading advisories: {e}");
            return ExitCode::from(2);
        }
    };

    if let Err(e) = enrich_advisories(&mut advisories, cli.epss_scores.as_deref(), cli.kev_catalog.as_deref()) {
        eprintln!("error loading enrichment data: {e}");
        return ExitCode::from(2);
    }

    let provider = StaticAdvisoryProvider::new(advisories);
    let orchestrator_config = OrchestratorConfig::default();
    let parsers = EcosystemParserRegistry::with_defaults();
    let resolvers = TransitiveResolverRegistry::with_defaults();

    let mut result = scan_project(
        Path::new(&cli.path),
        &config,
        &orchestrator_config,
        &provider,
        &parsers,
        &resolvers,
    )
    .await;

    if !result.success {
        eprintln!("scan error: {}", result.error.as_deref().unwrap_or("unknown error"));
        return ExitCode::from(2);
    }

    if config.only_reachable {
        result.findings.retain(|f| f.is_reachable);
    }

    if cli.json {
        match serde_json::to_string_pretty(&result) {
            Ok(s) => println!("{s}"),
            Err(e) => {
                eprintln!("error serializing result: {e}");
                return ExitCode::from(2);
            }
        }
    } else {
        output::print_table(&result);
    }

    if output::has_reachable_critical_or_high(&result) {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn load_advisories(path: Option<&str>) -> anyhow::Result<Vec<Advisory>> {
    match path {
        None => Ok(Vec::new()),
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            Ok(serde_json::from_str(&content)?)
        }
    }
}

/// Attach EPSS scores and the CISA KEV flag to `advisories` in place, when
/// the caller passed either file. Advisories carry no alias list, so lookups
/// only match on the advisory's own `id`.
fn enrich_advisories(advisories: &mut [Advisory], epss_scores_path: Option<&str>, kev_catalog_path: Option<&str>) -> anyhow::Result<()> {
    if let Some(path) = epss_scores_path {
        let scores = epss::load_epss_scores(path)?;
        for advisory in advisories.iter_mut() {
            advisory.epss = epss::find_epss_score(&advisory.id, &[], &scores);
        }
    }

    if let Some(path) = kev_catalog_path {
        let catalog = kev::load_kev_catalog(path)?;
        for advisory in advisories.iter_mut() {
            advisory.kev = kev::is_known_exploited(&advisory.id, &[], &catalog);
        }
    }

    Ok(())
}
