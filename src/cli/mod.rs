pub mod commands;
pub mod output;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "taxbridge",
    version,
    about = "Crosswalk an internal taxonomy onto Catalog of Life name usages",
    long_about = "Taxbridge matches taxa from an internal observation-platform taxonomy to \
                  ColDP name usages using exact name/rank passes and optional fuzzy matching \
                  with lineage-based homonym resolution, then attaches common names."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Verbosity level (can be repeated)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Hide progress bars and summaries
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build the taxon crosswalk and write it to a sink
    Map(commands::map::MapArgs),

    /// Attach common names to source taxa through a crosswalk
    CommonNames(commands::common_names::CommonNamesArgs),

    /// Create or inspect configuration files
    Config(commands::config::ConfigArgs),
}
