// Wires the parsed command line to the finder

use std::io::Write;

use dupfinder_core::{DuplicateFinder, DuplicateReport, FinderConfig};

use crate::{
    cli::Cli,
    error::{CliError, CliResult},
    output::ReportSink,
};

/// Resolve configuration: file and environment first, then CLI overrides
pub fn resolve_config(cli: &Cli) -> CliResult<FinderConfig> {
    let mut config = FinderConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url.clone());
    }
    if let Some(api_version) = &cli.api_version {
        config = config.with_api_version(api_version.clone());
    }
    config.validate()?;
    Ok(config)
}

/// Fetch and aggregate; nothing is written here
pub async fn build_report(cli: &Cli, config: &FinderConfig) -> CliResult<DuplicateReport> {
    let token = cli.token().ok_or(CliError::MissingToken)?;
    let finder = DuplicateFinder::new(config, &cli.org_id, token)?;
    Ok(finder.run().await?)
}

/// Run one scan and emit the report, writing stdout output to `stdout`
pub async fn run_with(cli: &Cli, config: &FinderConfig, stdout: &mut dyn Write) -> CliResult<()> {
    let report = build_report(cli, config).await?;
    let json = report.to_json_pretty()?;
    ReportSink::from_path(cli.output.as_deref()).write_to(&json, stdout)
}

/// Run one scan from the command line
pub async fn run(cli: &Cli) -> CliResult<()> {
    let config = resolve_config(cli)?;
    let report = build_report(cli, &config).await?;
    ReportSink::from_path(cli.output.as_deref()).write(&report.to_json_pretty()?)
}
