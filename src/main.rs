use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use ghost_hunter::analysis::engine::DecisionEngine;
use ghost_hunter::analysis::validator::ValidityRule;
use ghost_hunter::analysis::AnalysisReport;
use ghost_hunter::config::{Config, ConfigOverrides};
use ghost_hunter::output::json::render_json;
use ghost_hunter::output::table::render_report_table;
use ghost_hunter::satellite::http::HttpImagerySource;
use ghost_hunter::satellite::{ImageryRequest, ImagerySource, ObservationWindow, SatelliteData};
use ghost_hunter::server::run_server;
use tracing::warn;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Debug, Parser)]
#[command(
    name = "ghost-hunter",
    about = "Satellite verification of infrastructure and remediation projects"
)]
struct Cli {
    #[arg(short, long)]
    config: Option<PathBuf>,
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    output: OutputFormat,
    #[arg(long = "validity-rule")]
    validity_rule: Option<ValidityRule>,
    #[arg(long)]
    seed: Option<u64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Classify a project from an NDVI reading supplied on the command line.
    Analyze {
        #[arg(long)]
        category: String,
        #[arg(long, allow_hyphen_values = true)]
        ndvi: Option<f64>,
    },
    /// Fetch imagery for a site and classify it.
    Verify {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lon: f64,
        #[arg(long)]
        category: String,
        #[arg(long, default_value = "cli")]
        id: String,
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Run the REST verification service.
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Write or print the configuration file.
    Config {
        #[arg(long)]
        init: bool,
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let mut config = Config::load(Some(&config_path))?;
    config.apply_overrides(ConfigOverrides {
        endpoint: match &cli.command {
            Commands::Verify { endpoint, .. } => endpoint.clone(),
            _ => None,
        },
        validity_rule: cli.validity_rule,
        seed: cli.seed,
    });

    match &cli.command {
        Commands::Analyze { category, ndvi } => {
            let data = SatelliteData {
                ndvi_mean: *ndvi,
                ..SatelliteData::default()
            };
            let report = DecisionEngine::from_config(&config.analysis).analyze(category, &data);
            print_report(category, &report, cli.output)?;
        }
        Commands::Verify {
            lat,
            lon,
            category,
            id,
            ..
        } => {
            let source =
                HttpImagerySource::new(&config.imagery.endpoint, config.imagery.timeout_secs)
                    .context("failed building imagery client")?;
            let data = source
                .fetch(&ImageryRequest {
                    latitude: *lat,
                    longitude: *lon,
                    window: ObservationWindow::trailing(
                        Utc::now().date_naive(),
                        config.imagery.window_days,
                    ),
                    buffer_meters: config.imagery.buffer_meters,
                })
                .await;
            if let Some(error) = &data.error {
                warn!("satellite data unavailable: {error}");
            }
            let report = DecisionEngine::from_config(&config.analysis).analyze(category, &data);
            print_report(id, &report, cli.output)?;
        }
        Commands::Serve { host, port } => {
            let host = host.clone().unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);
            let bind = format!("{host}:{port}");
            let addr: SocketAddr = bind
                .parse()
                .map_err(|e| anyhow!("invalid bind address {bind}: {e}"))?;
            run_server(config, addr).await?;
        }
        Commands::Config { init, show } => {
            if *init {
                Config::write_template(&config_path)?;
                println!("Wrote config template to {}", config_path.display());
            }
            if *show || !*init {
                println!("{}", render_json(&config)?);
            }
        }
    }

    Ok(())
}

fn print_report(project: &str, report: &AnalysisReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Table => println!("{}", render_report_table(project, report)),
        OutputFormat::Json => println!("{}", render_json(report)?),
    }
    Ok(())
}
