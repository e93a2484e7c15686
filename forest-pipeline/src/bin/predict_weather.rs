use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::eyre;
use crowd_rforest::query::{WeatherParameters, WeatherQuery};
use forest_pipeline::config::CommonArgs;
use forest_pipeline::logging;
use forest_pipeline::pipeline::predict_query;

/// Predict the weather condition by majority vote of the forest
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// "Today is <n> degree celcuis with <n>% humidity in <month>"
    #[arg(value_name = "SENTENCE", conflicts_with_all = ["temperature", "humidity", "month"])]
    sentence: Option<String>,

    /// Temperature in degrees Celsius
    #[arg(short = 't', long = "temperature", requires_all = ["humidity", "month"])]
    temperature: Option<f64>,

    /// Relative humidity in percent
    #[arg(short = 'u', long = "humidity", requires_all = ["temperature", "month"])]
    humidity: Option<f64>,

    /// Month number, 1-12
    #[arg(short = 'n', long = "month", requires_all = ["temperature", "humidity"])]
    month: Option<u32>,

    /// Forest file to use instead of the latest one
    #[arg(short = 'f', long = "forest", value_name = "FOREST_FILE")]
    forest: Option<PathBuf>,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();
    let args = Cli::parse();

    let config = args.common.resolve()?;

    let query = match (args.sentence, args.temperature, args.humidity, args.month) {
        (Some(sentence), ..) => WeatherQuery::Sentence(sentence),
        (None, Some(temperature), Some(humidity), Some(month)) => {
            WeatherQuery::Numeric(WeatherParameters {
                temperature,
                humidity,
                month,
            })
        }
        _ => return Err(eyre!("Give a sentence or all of --temperature, --humidity and --month")),
    };

    let report = predict_query(&config, &query, args.forest.as_deref())?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
