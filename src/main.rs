use anyhow::{Context, Result};
use chrono::{Local, Months, NaiveDate};
use clap::{Parser, Subcommand};
use colored::*;
use rust_decimal::prelude::ToPrimitive;
use serde_json::json;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use uuid::Uuid;

use volcast::error::ErrorSeverity;
use volcast::logging::init_logging;
use volcast::{
    events, forecast, report, volume, AppConfig, ClientError, ForecastParams, ForecastSummary, LogFormat,
    LogLevel, VolcastError, Vo2Client, VolumeResponse,
};

/// volcast - Weekly Training Volume CLI
///
/// Aggregates weekly training volume from the VO2 metrics API, projects a
/// mileage build and runs the API proxy used by the browser dashboard.
#[derive(Parser)]
#[command(name = "volcast")]
#[command(author = "volcast contributors")]
#[command(version)]
#[command(about = "Weekly training volume and forecast CLI", long_about = None)]
struct Cli {
    /// Sets a custom config file
    #[arg(short, long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Increase verbosity of output
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Log format (pretty, json, compact)
    #[arg(long, value_name = "FORMAT", global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the metrics API proxy
    Serve {
        /// Listen address (overrides the config file)
        #[arg(short, long)]
        bind: Option<SocketAddr>,
    },

    /// Show weekly volume with week-over-week changes
    Volume {
        /// Read a saved volume response instead of calling the API
        #[arg(short, long, conflicts_with = "athlete")]
        file: Option<PathBuf>,

        /// Athlete ID (defaults to the configured athlete)
        #[arg(short, long)]
        athlete: Option<Uuid>,

        /// First day queried (YYYY-MM-DD)
        #[arg(short, long)]
        since: Option<NaiveDate>,

        /// Print JSON instead of tables
        #[arg(long)]
        json: bool,
    },

    /// Project weekly mileage from a baseline
    Forecast {
        /// Baseline weekly mileage in km
        #[arg(short, long)]
        baseline: f64,

        /// Start of the last completed week (YYYY-MM-DD, defaults to today)
        #[arg(short, long)]
        from: Option<String>,

        /// Weeks to project
        #[arg(short, long)]
        weeks: Option<u32>,

        /// Weekly increase in percent
        #[arg(short, long)]
        increase: Option<f64>,

        /// Rest week every N weeks (0 disables)
        #[arg(short, long)]
        rest: Option<u32>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Year-to-date running totals
    Ytd {
        /// Athlete ID (defaults to the configured athlete)
        #[arg(short, long)]
        athlete: Option<Uuid>,
    },

    /// Upcoming races with countdown
    Events {
        /// Include races already run
        #[arg(short, long)]
        all: bool,
    },

    /// Manage the configuration file
    Config {
        /// Write the default configuration file
        #[arg(long)]
        init: bool,

        /// Print the effective configuration
        #[arg(long)]
        show: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        match err.downcast_ref::<VolcastError>() {
            Some(volcast_err) => {
                match volcast_err.severity() {
                    ErrorSeverity::Warning => tracing::warn!(error = %volcast_err, "Command failed"),
                    _ => tracing::error!(error = %volcast_err, "Command failed"),
                }
                eprintln!("{} {}", "Error:".red().bold(), volcast_err.user_message());
                if volcast_err.is_retryable() {
                    eprintln!("{}", "The metrics API may be temporarily unavailable; try again shortly.".dimmed());
                }
            }
            None => {
                tracing::error!(error = %err, "Command failed");
                eprintln!("{} {:#}", "Error:".red().bold(), err);
            }
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let mut config = AppConfig::load(cli.config.as_deref())?;

    config.logging.level = LogLevel::from_verbosity(cli.verbose, config.logging.level);
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    init_logging(&config.logging).context("Failed to initialize logging")?;

    match cli.command {
        Commands::Serve { bind } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            volcast::proxy::serve(&config).await?;
        }

        Commands::Volume {
            file,
            athlete,
            since,
            json,
        } => {
            let response = match file {
                Some(path) => read_volume_file(&path)?,
                None => fetch_volume(&config, athlete, since).await?,
            };
            show_volume(&config, &response, json)?;
        }

        Commands::Forecast {
            baseline,
            from,
            weeks,
            increase,
            rest,
            json,
        } => {
            let params = ForecastParams {
                weeks_ahead: weeks.unwrap_or(config.forecast.weeks_ahead),
                weekly_increase_pct: increase.unwrap_or(config.forecast.weekly_increase_pct),
                rest_frequency: rest.unwrap_or(config.forecast.rest_frequency),
            }
            .clamped();
            let from = from.unwrap_or_else(|| Local::now().date_naive().format("%Y-%m-%d").to_string());

            let points = forecast::project(baseline, &from, &params);
            let summary = ForecastSummary::from_points(&points);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&json!({ "params": params, "summary": summary, "weeks": points }))?
                );
            } else if points.is_empty() {
                println!("{}", "No forecast: baseline must be a positive distance".yellow());
            } else {
                println!("{}", "Mileage forecast".cyan().bold());
                println!("{}", report::forecast_table(&points));
                println!("{}", report::forecast_summary_line(&summary).dimmed());
            }
        }

        Commands::Ytd { athlete } => {
            let client = client_for(&config)?;
            let athlete_id = athlete_for(&config, athlete)?;
            let ytd = client.running_ytd(athlete_id).await.map_err(VolcastError::from)?;

            println!("{}", "Running year to date".cyan().bold());
            println!("{}", report::ytd_summary(&ytd));
        }

        Commands::Events { all } => {
            let today = Local::now().date_naive();
            let countdowns = events::upcoming(&config.events, today, all);

            if countdowns.is_empty() {
                println!("{}", "No upcoming races configured".yellow());
            } else {
                println!("{}", "Race calendar".magenta().bold());
                println!("{}", report::events_table(&countdowns));
            }
        }

        Commands::Config { init, show } => {
            if init {
                let path = cli.config.clone().unwrap_or_else(AppConfig::default_config_path);
                if path.exists() {
                    anyhow::bail!("Config file already exists: {}", path.display());
                }
                AppConfig::default().save_to_file(&path)?;
                println!("{}", format!("✓ Wrote default configuration to {}", path.display()).green());
            }

            if show || !init {
                let mut shown = config.clone();
                if shown.upstream.has_api_key() {
                    shown.upstream.api_key = Some("<redacted>".to_string());
                }
                let toml_content =
                    toml::to_string_pretty(&shown).context("Failed to serialize configuration to TOML")?;
                println!("{}", toml_content);
            }
        }
    }

    Ok(())
}

fn read_volume_file(path: &Path) -> volcast::Result<VolumeResponse> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

fn client_for(config: &AppConfig) -> volcast::Result<Vo2Client> {
    let timeout = Duration::from_secs(config.server.upstream_timeout_secs);
    Ok(Vo2Client::new(&config.upstream, timeout)?)
}

fn athlete_for(config: &AppConfig, athlete: Option<Uuid>) -> volcast::Result<Uuid> {
    athlete.or(config.volume.athlete_id).ok_or_else(|| {
        VolcastError::Client(ClientError::MissingConfig {
            field: "athlete_id".to_string(),
        })
    })
}

async fn fetch_volume(
    config: &AppConfig,
    athlete: Option<Uuid>,
    since: Option<NaiveDate>,
) -> volcast::Result<VolumeResponse> {
    let client = client_for(config)?;
    let athlete_id = athlete_for(config, athlete)?;

    let today = Local::now().date_naive();
    let start_date = since.unwrap_or_else(|| {
        today
            .checked_sub_months(Months::new(config.volume.lookback_months))
            .unwrap_or(today)
    });

    let sports = config.volume.requested_sports();
    Ok(client.weekly_volume(athlete_id, &sports, start_date).await?)
}

fn show_volume(config: &AppConfig, response: &VolumeResponse, as_json: bool) -> Result<()> {
    let primary = volume::primary_series(&response.data, &config.volume.primary_sports);
    let reference_weeks = volume::week_keys(&primary);
    let cross_training = volume::aggregate(&response.data, &config.volume.cross_training_sports, &reference_weeks);

    let latest = primary.last();
    let projection = latest
        .map(|point| {
            let baseline = point.distance_km.to_f64().unwrap_or(0.0);
            forecast::project_from(baseline, point.week_start, &config.forecast)
        })
        .unwrap_or_default();

    if as_json {
        let output = json!({
            "primary": primary,
            "crossTraining": cross_training,
            "forecast": projection,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    let primary_names: Vec<String> = config.volume.primary_sports.iter().map(|s| s.display_name()).collect();
    println!("{}", format!("Weekly volume: {}", primary_names.join(" + ")).cyan().bold());
    if primary.is_empty() {
        println!("{}", "No activities in this period".yellow());
    } else {
        println!("{}", report::primary_table(&primary));
    }

    for sport in &config.volume.cross_training_sports {
        if let Some(table) = report::cross_training_table(&cross_training, sport) {
            println!();
            println!("{}", sport.display_name().blue().bold());
            println!("{}", table);
        }
    }

    if !projection.is_empty() {
        println!();
        println!("{}", "Mileage forecast".cyan().bold());
        println!("{}", report::forecast_table(&projection));
        println!(
            "{}",
            report::forecast_summary_line(&ForecastSummary::from_points(&projection)).dimmed()
        );
    }

    Ok(())
}
