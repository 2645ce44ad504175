//! Main entry point for the scenario runner binary

use anyhow::Context;
use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use adapters::TransportFactory;
use adapters::broker::BrokerConfig;
use engine::cli::Args;
use engine::{ConsoleReporter, Engine};
use shared::Feature;
use shared::logging::{self, format_timestamp};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    let args = Args::parse();

    if let Err(e) = logging::init_tracing(&args.log_config()) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            tracing::error!("{e:#}");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> anyhow::Result<bool> {
    let feature = Feature::load(&args.feature_file)
        .with_context(|| format!("loading {}", args.feature_file.display()))?;

    let broker_config = BrokerConfig::from_env(args.kafka_properties.as_deref())
        .context("resolving broker configuration")?;
    tracing::debug!(
        source = ?broker_config.source(),
        bootstrap_servers = broker_config.bootstrap_servers().unwrap_or("<unset>"),
        "Broker configuration resolved"
    );

    let config = args.engine_config().context("configuring the engine")?;
    let engine = Engine::new(Arc::new(TransportFactory::from_broker_config(broker_config)), config);
    let reporter = ConsoleReporter::stdout();

    if config.flags.is_describe() {
        let info = engine.describe(&feature, &reporter);
        return Ok(info.total_scenarios > 0);
    }

    let report = engine.execute(&feature, &reporter).await;
    tracing::info!(
        run_id = %report.info.run_id,
        started_at = %format_timestamp(report.info.started_at),
        passed = report.passed,
        "Scenario run complete"
    );
    Ok(report.passed)
}
