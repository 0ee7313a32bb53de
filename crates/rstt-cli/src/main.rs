//! # rstt-predict
//!
//! Command-line interface for the RSTT travel-time predictor.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rstt_core::PredictionRequest;
use rstt_predictor::{PredictorConfig, SlbmPredictor, SUPPORTED_PHASES};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rstt-predict")]
#[command(about = "Regional travel-time predictions with the RSTT engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Predict every request in a JSON file, one JSON outcome per line
    Predict {
        /// Properties file (YAML)
        #[arg(short, long)]
        properties: PathBuf,

        /// JSON array of prediction requests
        #[arg(short, long)]
        requests: PathBuf,

        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show the loaded engine, model and uncertainty configuration
    Info {
        /// Properties file (YAML)
        #[arg(short, long)]
        properties: PathBuf,
    },
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    match cli.command {
        Commands::Predict {
            properties,
            requests,
            output,
        } => predict(&properties, &requests, output.as_deref()),
        Commands::Info { properties } => info(&properties),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Load the configuration and bind a predictor to the process-wide engine.
/// An engine that cannot be loaded terminates the process.
fn load_predictor(properties: &Path) -> Result<(PredictorConfig, SlbmPredictor<'static>)> {
    let config = PredictorConfig::load(properties)
        .with_context(|| format!("invalid properties file {}", properties.display()))?;
    let handle = rstt_engine::resolve_or_exit(&config.engine);
    let predictor = SlbmPredictor::with_handle(handle, &config)?;
    Ok((config, predictor))
}

fn predict(properties: &Path, requests: &Path, output: Option<&Path>) -> Result<()> {
    let (_, predictor) = load_predictor(properties)?;

    let text = std::fs::read_to_string(requests)
        .with_context(|| format!("failed to read {}", requests.display()))?;
    let requests: Vec<PredictionRequest> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a JSON array of requests", requests.display()))?;

    let outcomes = predictor.predict_batch(&requests);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };
    for outcome in &outcomes {
        serde_json::to_writer(&mut writer, outcome)?;
        writeln!(writer)?;
    }
    writer.flush()?;

    let failures = outcomes.iter().filter(|o| !o.is_success()).count();
    tracing::info!(requests = outcomes.len(), failures, "predictions written");
    Ok(())
}

fn info(properties: &Path) -> Result<()> {
    let (config, predictor) = load_predictor(properties)?;
    let handle = predictor.handle();
    let cutoffs = handle.cutoffs();
    let show = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{}", v));

    println!("predictor:         {}", predictor.predictor_name());
    println!("engine version:    {}", predictor.engine_version());
    println!("engine library:    {}", handle.library());
    println!("model:             {}", handle.model_path().display());
    println!("uncertainty type:  {}", predictor.uncertainty_type());
    println!("az/sh uncertainty: {}", config.az_sh.describe());
    println!(
        "max distance:      {}",
        show(cutoffs.max_distance_radians.map(f64::to_degrees))
    );
    println!("max depth:         {}", show(cutoffs.max_depth_km));
    println!("ch max:            {}", show(cutoffs.ch_max));
    println!("phases:            {}", SUPPORTED_PHASES.join(", "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_predict() {
        let cli = Cli::try_parse_from([
            "rstt-predict",
            "predict",
            "--properties",
            "rstt.yaml",
            "-r",
            "requests.json",
        ])
        .unwrap();
        match cli.command {
            Commands::Predict {
                properties,
                requests,
                output,
            } => {
                assert_eq!(properties, PathBuf::from("rstt.yaml"));
                assert_eq!(requests, PathBuf::from("requests.json"));
                assert_eq!(output, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_info_requires_properties() {
        assert!(Cli::try_parse_from(["rstt-predict", "info"]).is_err());
    }
}
