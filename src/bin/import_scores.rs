use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::path::PathBuf;

use score_service::{config::Config, database, services::import_scores};

#[derive(Parser)]
#[command(name = "import_scores")]
#[command(about = "Import user scores from a CSV file and report the top scorers", version)]
struct Args {
    /// CSV file with `first name,second name,score` rows (header optional)
    input: PathBuf,

    /// Write the report here instead of stdout
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    dotenv::dotenv().ok();
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let config = Config::from_env()?;

    let input = fs::read_to_string(&args.input)
        .with_context(|| format!("Invalid Arguments: cannot read input file {:?}", args.input))?;

    let stores = database::connect(&config)
        .await
        .context("Failed to connect to the score store")?;

    let report = import_scores(stores.scores.as_ref(), &input).await?;
    if report.rows_skipped > 0 {
        log::warn!("⚠️  {} malformed rows skipped", report.rows_skipped);
    }

    let rendered = report.render();
    match &args.output {
        Some(path) => fs::write(path, &rendered)
            .with_context(|| format!("Failed to write report to {:?}", path))?,
        None => println!("{}", rendered),
    }

    Ok(())
}
