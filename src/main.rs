use std::sync::Arc;

use anyhow::{Context, Result};

use quant_forecast::config::Config;
use quant_forecast::error::ServiceStatus;
use quant_forecast::model::forecast::PredictionRequest;
use quant_forecast::monitoring::TracingSink;
use quant_forecast::provider::HttpMarketProvider;
use quant_forecast::service::ForecastService;

const DEFAULT_HORIZON_DAYS: u32 = 3;

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(if config.logging.level.trim().is_empty() {
            "info"
        } else {
            config.logging.level.as_str()
        })
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json {
        builder.with_ansi(false).json().init();
    } else {
        builder.init();
    }
}

fn exit_code(status: ServiceStatus) -> i32 {
    match status {
        ServiceStatus::Degraded => 3,
        ServiceStatus::BadInput => 2,
        ServiceStatus::Internal => 1,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {:#}", e);
            eprintln!("Set FORECAST_CONFIG or provide config/default.toml");
            std::process::exit(1);
        }
    };
    init_tracing(&config);

    let mut args = std::env::args().skip(1);
    let command = args.next().unwrap_or_else(|| "predict".to_string());

    tracing::info!(
        symbol = %config.provider.target_symbol,
        model_id = %config.model.model_id,
        command = %command,
        "Starting quant-forecast"
    );

    let provider = HttpMarketProvider::new(config.provider.clone())
        .context("failed to build market data provider")?;
    let sink = Arc::new(TracingSink::new(config.monitoring.shadow_error_window));
    let service = match ForecastService::load(config, provider, sink) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Failed to load model artifacts: {}", e);
            std::process::exit(exit_code(e.status()));
        }
    };

    match command.as_str() {
        "health" => {
            println!("{}", serde_json::to_string_pretty(&service.health())?);
        }
        "predict" => {
            let horizon_days = match args.next() {
                Some(raw) => raw
                    .parse::<u32>()
                    .with_context(|| format!("horizon must be a whole number of days: {}", raw))?,
                None => DEFAULT_HORIZON_DAYS,
            };
            match service.predict(PredictionRequest { horizon_days }).await {
                Ok(response) => println!("{}", serde_json::to_string_pretty(&response)?),
                Err(e) => {
                    tracing::error!(error = %e, "prediction failed");
                    eprintln!("Prediction failed: {}", e);
                    std::process::exit(exit_code(e.status()));
                }
            }
        }
        other => {
            eprintln!("Unknown command: {} (expected `predict [days]` or `health`)", other);
            std::process::exit(2);
        }
    }

    Ok(())
}
