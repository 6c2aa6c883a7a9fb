use std::path::PathBuf;

use anyhow::Result;
use cancer_detection_server::config::Settings;
use cancer_detection_server::train;
use clap::Parser;
use tracing_subscriber::EnvFilter;

/// Train the classifier and persist the artifact plus its run metrics.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the artifact and metrics are written into.
    #[arg(long, default_value = "models")]
    output_dir: PathBuf,
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();
    let settings = Settings::from_env();
    let outcome = train::train(&settings, &args.output_dir)?;
    println!("{}", outcome.model_path.display());
    Ok(())
}
