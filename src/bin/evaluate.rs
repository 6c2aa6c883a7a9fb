use std::path::PathBuf;

use anyhow::Result;
use cancer_detection_server::config::Settings;
use cancer_detection_server::evaluate;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Score a persisted artifact against the full reference dataset.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Artifact to evaluate; defaults to the configured model path.
    #[arg(long)]
    model_path: Option<PathBuf>,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let settings = Settings::from_env();
    let model_path = args.model_path.unwrap_or(settings.model_path);
    let report = evaluate::evaluate(&model_path)?;
    println!("{report}");
    Ok(())
}
