use clap::Parser;
use color_eyre::Result;
use crowd_rforest::aggregate::EncoderPolicy;
use forest_pipeline::config::CommonArgs;
use forest_pipeline::logging;
use forest_pipeline::pipeline::aggregate_models;

/// Combine every trained tree into a new forest model
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Fail when trees disagree on their label encoder instead of keeping the first
    #[arg(long = "strict-encoders")]
    strict_encoders: bool,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();
    let args = Cli::parse();

    let mut config = args.common.resolve()?;
    if args.strict_encoders {
        config.encoder_policy = EncoderPolicy::Strict;
    }

    let (path, forest) = aggregate_models(&config)?;
    println!(
        "{}",
        serde_json::to_string_pretty(&serde_json::json!({
            "path": path,
            "metadata": forest.metadata,
        }))?
    );

    Ok(())
}
