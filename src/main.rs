//! clawcost - Cost reports for OpenClaw agent sessions

use anyhow::Context;
use clap::Parser;
use clawcost::{
    cli::{Cli, Command, ReportArgs},
    output::get_formatter,
    provider::SessionSource,
    report::{ReportConfig, ReportGenerator},
    timezone::TimezoneConfig,
};
use clawcost_provider_openclaw::SessionLoader;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn init_logging(verbose: bool) {
    // RUST_LOG wins when set, otherwise stay quiet unless --verbose
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            tracing_subscriber::EnvFilter::new("clawcost=info,clawcost_provider_openclaw=info")
        } else {
            tracing_subscriber::EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_report(cli: &Cli, args: &ReportArgs) -> anyhow::Result<()> {
    let timezone = TimezoneConfig::from_cli(cli.timezone.as_deref(), cli.utc)?;
    info!("Using timezone: {}", timezone.display_name());

    let show_progress = !args.json && is_terminal::is_terminal(std::io::stderr());
    let loader = SessionLoader::discover(cli.agents_dir.clone())
        .context("cannot open agents directory")?
        .with_progress(show_progress);

    let sessions = loader
        .collect_sessions(args.agent.as_deref())
        .await
        .with_context(|| format!("failed to load sessions from {}", loader.agents_dir().display()))?;
    info!("Loaded {} sessions", sessions.len());

    let mut config = ReportConfig::default()
        .with_scheduled_jobs(args.crons)
        .with_models(!args.skip_models)
        .with_full(args.full)
        .with_anomaly_threshold(args.threshold)
        .with_timezone(timezone);
    if let Some(period) = args.period {
        config = config.with_period(period);
    }
    if let Some(agent) = &args.agent {
        config = config.with_agent_filter(agent.clone());
    }

    let report = ReportGenerator::new(config)
        .with_parallel(args.parallel)
        .generate(&sessions);

    let colored = !cli.no_color && is_terminal::is_terminal(std::io::stdout());
    let formatter = get_formatter(args.json, colored);
    print!(
        "{}",
        formatter
            .format_report(&report)
            .context("failed to render report")?
    );
    Ok(())
}

async fn run_agents(cli: &Cli, json: bool) -> anyhow::Result<()> {
    let loader =
        SessionLoader::discover(cli.agents_dir.clone()).context("cannot open agents directory")?;
    let agents = loader
        .list_agents()
        .await
        .context("failed to list agents")?;

    let colored = !cli.no_color && is_terminal::is_terminal(std::io::stdout());
    print!("{}", get_formatter(json, colored).format_agents(&agents)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.no_color {
        colored::control::set_override(false);
    }

    match &cli.command {
        Command::Report(args) => {
            info!("Running cost report");
            run_report(&cli, args).await
        }
        Command::Agents { json } => run_agents(&cli, *json).await,
    }
}
