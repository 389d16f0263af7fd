use clap::Args;
use std::path::{Path, PathBuf};

use crate::bio::coldp::load_vernacular_names;
use crate::bio::expanded_taxa::load_expanded_taxa;
use crate::bio::taxonomy::MatchRecord;
use crate::cli::output::{format_number, success};
use crate::core::config::{load_config, Config};
use crate::core::enrichment::{write_common_names_tsv, CommonNameResolver};
use crate::storage::sqlite::SqliteSink;
use crate::storage::tsv::read_crosswalk_tsv;
use crate::utils::progress::spinner_or_hidden;
use crate::TaxbridgeError;

#[derive(Args, Debug)]
pub struct CommonNamesArgs {
    /// Internal taxonomy export (expanded_taxa TSV)
    #[arg(long, value_name = "TSV")]
    pub taxa: PathBuf,

    /// Crosswalk written by `taxbridge map` (TSV, or SQLite by extension)
    #[arg(long, value_name = "PATH")]
    pub crosswalk: PathBuf,

    /// ColDP VernacularName.tsv
    #[arg(long, value_name = "TSV")]
    pub vernacular: PathBuf,

    /// Output TSV, fully rewritten
    #[arg(short, long, value_name = "TSV")]
    pub output: PathBuf,

    /// ISO 639-3 language code of the common names
    #[arg(long, value_name = "CODE")]
    pub language: Option<String>,

    /// Accept vernacular names not flagged preferred
    #[arg(long)]
    pub any_preferred: bool,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Passed from the global --quiet flag
    #[arg(skip)]
    pub quiet: bool,
}

fn is_sqlite_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("db" | "sqlite" | "sqlite3")
    )
}

/// Read a crosswalk from either sink format.
pub fn load_crosswalk(path: &Path) -> Result<Vec<MatchRecord>, TaxbridgeError> {
    if is_sqlite_path(path) {
        SqliteSink::open(path)?.read_all()
    } else {
        Ok(read_crosswalk_tsv(path)?.0)
    }
}

pub fn build_config(args: &CommonNamesArgs) -> Result<Config, TaxbridgeError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };
    if let Some(language) = &args.language {
        config.enrichment.language = language.clone();
    }
    if args.any_preferred {
        config.enrichment.preferred_only = false;
    }
    config.validate()?;
    Ok(config)
}

pub fn run(args: CommonNamesArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;

    let spinner = spinner_or_hidden("Loading internal taxonomy...", args.quiet);
    let (taxa, _) = load_expanded_taxa(&args.taxa)?;
    spinner.set_message("Loading crosswalk...");
    let crosswalk = load_crosswalk(&args.crosswalk)?;
    spinner.set_message("Loading vernacular names...");
    let (vernacular, _) = load_vernacular_names(&args.vernacular)?;
    spinner.finish_and_clear();

    let resolver = CommonNameResolver::new(&crosswalk, &vernacular, &config.enrichment);
    let rows = resolver.rows(&taxa);
    let named = write_common_names_tsv(&args.output, &rows)?;

    if !args.quiet {
        success(&format!(
            "Wrote {} taxa ({} with a common name) to {}",
            format_number(rows.len()),
            format_number(named),
            args.output.display()
        ));
    }
    Ok(())
}
