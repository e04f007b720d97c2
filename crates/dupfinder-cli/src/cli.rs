// Command line definition

use std::path::PathBuf;

use clap::Parser;

/// Environment variable holding the Snyk API token
pub const TOKEN_ENV: &str = "SNYK_TOKEN";

/// dupfinder - find duplicate Snyk projects in an organization
#[derive(Parser, Debug, Clone)]
#[command(name = "dupfinder")]
#[command(bin_name = "dupfinder")]
#[command(about = "Find duplicate Snyk projects in an organization")]
#[command(
    long_about = "Lists every project of a Snyk organization, groups them by target and project name, and reports every name that appears more than once under the same target.\n\nThe report is JSON, written to stdout unless --output is given."
)]
#[command(version)]
pub struct Cli {
    /// Snyk organization ID
    #[arg(value_name = "ORG_ID")]
    pub org_id: String,

    /// Snyk API token
    #[arg(long, env = TOKEN_ENV, hide_env_values = true)]
    pub api_token: Option<String>,

    /// Output file path (default: stdout)
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Configuration file (default: <config dir>/dupfinder/config.toml)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// REST API base URL, e.g. https://api.snyk.io/rest
    #[arg(long, value_name = "URL")]
    pub base_url: Option<String>,

    /// REST API version
    #[arg(long, value_name = "VERSION")]
    pub api_version: Option<String>,

    /// Enable verbose output
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    /// API token, ignoring blank values
    pub fn token(&self) -> Option<&str> {
        self.api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
    }
}
