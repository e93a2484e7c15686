use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use crowd_rforest::flat::{FlatForest, FlatNode};
use forest_pipeline::config::CommonArgs;
use forest_pipeline::logging;
use forest_pipeline::model_files::read_forest;
use forest_pipeline::pipeline::locate_forest;

/// Print the layout of a forest model
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Forest file to inspect instead of the latest one
    #[arg(short = 'f', long = "forest", value_name = "FOREST_FILE")]
    forest: Option<PathBuf>,

    /// Also print every node
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    logging::init();
    let args = Cli::parse();

    let config = args.common.resolve()?;
    let path = locate_forest(&config, args.forest.as_deref())?;
    let record = read_forest(&path)?;
    let forest = FlatForest::from_record(&record);

    let branch_cnt = forest.nodes().iter().filter(|n| matches!(n, FlatNode::Branch(_))).count();
    let leaf_cnt = forest.nodes().len() - branch_cnt;
    let max_depth = record.trees().map(|t| t.depth()).max().unwrap_or(0);

    println!("Forest {}\n", path.display());
    println!(
        "--- Layout ---\nTrees: {} | Nodes: {} | Branches: {}, leaves: {} | Max depth: {}\n--------------\n",
        forest.num_trees(),
        forest.nodes().len(),
        branch_cnt,
        leaf_cnt,
        max_depth,
    );
    println!(
        "--- Metadata ---\nCreated: {} | Sources: {}\n----------------\n",
        record.metadata.created_at,
        record.metadata.source_files.join(", "),
    );

    if max_depth == 0 && forest.num_trees() > 0 {
        println!("Every tree is a single leaf: votes only depend on each tree's training mean.\n");
    }

    if args.verbose {
        print!("{forest}");
    }

    Ok(())
}
