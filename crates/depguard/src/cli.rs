use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "depguard", version, about = "Reachability-aware dependency vulnerability scanner", long_about = None)]
pub struct Cli {
    /// Path to the project to scan (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: String,

    /// Path to a config file (.toml or .json); falls back to defaults when absent
    #[arg(long, short = 'c', value_name = "FILE")]
    pub config: Option<String>,

    /// Path to a pre-fetched advisory dump (JSON array of advisories); empty when absent
    #[arg(long, short = 'a', value_name = "FILE")]
    pub advisories: Option<String>,

    /// Path to an EPSS scores CSV; when set, scores are attached to matching advisories
    #[arg(long, value_name = "FILE")]
    pub epss_scores: Option<String>,

    /// Path to the CISA KEV catalog JSON; when set, matching advisories are flagged kev=true
    #[arg(long, value_name = "FILE")]
    pub kev_catalog: Option<String>,

    /// Only print findings that are reachable
    #[arg(long)]
    pub only_reachable: bool,

    /// Emit the full scan result as JSON instead of a text table
    #[arg(long)]
    pub json: bool,

    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
