use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use forest_pipeline::config::CommonArgs;
use forest_pipeline::dataset::parse_labels;
use forest_pipeline::logging;
use forest_pipeline::pipeline::train_split;

/// Train one tree on a CSV split and store it in the model directory
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// CSV split: three feature columns, then the target
    #[arg(short = 'i', long = "input", value_name = "INPUT_FILE")]
    input: PathBuf,

    /// Label codes for numeric targets, e.g. `sunny=0,rainy=1`
    #[arg(short = 'l', long = "labels", value_name = "LABELS")]
    labels: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();
    let args = Cli::parse();

    let config = args.common.resolve()?;
    let labels = args.labels.as_deref().map(parse_labels).transpose()?;

    let outcome = train_split(&config, &args.input, labels)?;
    println!("{}", serde_json::to_string_pretty(&outcome.report)?);

    Ok(())
}
