//! reporting-bdd: acceptance runner
//!
//! Runs the reporting feature files against the configured environment.
//!
//! ## Configuration
//! - `reporting-bdd.yaml` in the working directory, `--config <path>`, or
//!   REPORTING_BDD_CONFIG
//! - REPORTING_BDD__SECTION__KEY environment overrides
//! - REPORTING_BDD_LOG: tracing filter (default: info)

use std::path::PathBuf;

use clap::Parser;
use tracing::info;

use reporting_bdd::utils::bootstrap::init_tracing;
use reporting_bdd::world::{self, Harness};
use reporting_bdd::Config;

#[derive(Debug, Parser)]
#[command(name = "reporting-bdd", version, about = "Run the reporting acceptance features")]
struct Cli {
    /// Feature file or directory (defaults to runner.features)
    features: Option<PathBuf>,

    /// YAML configuration file layered over the defaults
    #[arg(short, long)]
    config: Option<String>,

    /// Print the registered step phrases and exit
    #[arg(long)]
    list: bool,
}

reporting_bdd::step_definitions!();

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing();

    let config = Config::load(cli.config.as_deref())?;
    let harness = Harness::from_config(&config)?;

    if cli.list {
        for (keyword, pattern) in harness.registry.patterns() {
            println!("{} {}", keyword, pattern);
        }
        return Ok(());
    }

    let features = cli
        .features
        .unwrap_or_else(|| PathBuf::from(&config.runner.features));
    info!(
        features = %features.display(),
        organization = %config.organization.fiscal_code,
        step_timeout_ms = config.runner.step_timeout_ms,
        "reporting-bdd started"
    );

    world::install(harness);
    world::run_features(&features, config.runner.max_concurrent_scenarios).await;
    Ok(())
}
