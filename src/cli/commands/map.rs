use clap::Args;
use std::path::{Path, PathBuf};

use crate::bio::coldp::load_name_usage;
use crate::bio::expanded_taxa::load_expanded_taxa;
use crate::cli::output::{format_number, info, print_report, success, warning};
use crate::core::config::{load_config, Config};
use crate::core::resolver::CrosswalkResolver;
use crate::storage::sqlite::SqliteSink;
use crate::storage::traits::CrosswalkSink;
use crate::storage::tsv::TsvSink;
use crate::storage::writer::persist_matches;
use crate::utils::progress::spinner_or_hidden;
use crate::TaxbridgeError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum SinkKind {
    /// SQLite database, table `source_to_coldp_taxon_map`
    Sqlite,
    /// Tab-separated file
    Tsv,
}

#[derive(Args, Debug)]
pub struct MapArgs {
    /// Internal taxonomy export (expanded_taxa TSV)
    #[arg(long, value_name = "TSV")]
    pub taxa: PathBuf,

    /// ColDP NameUsage.tsv
    #[arg(long, value_name = "TSV")]
    pub name_usage: PathBuf,

    /// Where the crosswalk is written; fully rewritten on every run
    #[arg(short, long, value_name = "PATH")]
    pub output: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value = "sqlite")]
    pub sink: SinkKind,

    /// Fuzzy-match taxa the exact passes leave unmatched
    #[arg(long)]
    pub fuzzy: bool,

    /// Minimum similarity (0-100) for fuzzy candidates (requires --fuzzy)
    #[arg(long, value_name = "SCORE")]
    pub fuzzy_threshold: Option<f64>,

    /// Worker threads for the fuzzy stage (requires --fuzzy)
    #[arg(long, value_name = "N")]
    pub workers: Option<usize>,

    /// Taxa per fuzzy batch
    #[arg(long, value_name = "N")]
    pub batch_size: Option<usize>,

    /// Also match taxa flagged inactive
    #[arg(long)]
    pub include_inactive: bool,

    /// Configuration file
    #[arg(short = 'c', long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Write the run summary as JSON
    #[arg(long, value_name = "JSON")]
    pub report: Option<PathBuf>,

    /// Passed from the global --quiet flag
    #[arg(skip)]
    pub quiet: bool,
}

/// Config file (or defaults) with command-line overrides applied on top.
pub fn build_config(args: &MapArgs) -> Result<Config, TaxbridgeError> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => Config::default(),
    };

    if args.fuzzy {
        config.matching.fuzzy_enabled = true;
    }
    if !config.matching.fuzzy_enabled {
        let mut conflicting = Vec::new();
        if args.fuzzy_threshold.is_some() {
            conflicting.push("--fuzzy-threshold");
        }
        if args.workers.is_some() {
            conflicting.push("--workers");
        }
        if !conflicting.is_empty() {
            return Err(TaxbridgeError::Configuration(format!(
                "{} given but fuzzy matching is disabled (add --fuzzy)",
                conflicting.join(" and ")
            )));
        }
    }

    if let Some(threshold) = args.fuzzy_threshold {
        config.matching.fuzzy_threshold = threshold;
    }
    if let Some(workers) = args.workers {
        config.performance.workers = Some(workers);
    }
    if let Some(batch_size) = args.batch_size {
        config.performance.batch_size = batch_size;
    }
    if args.include_inactive {
        config.matching.include_inactive = true;
    }

    config.validate()?;
    Ok(config)
}

fn open_sink(kind: SinkKind, path: &Path) -> Result<Box<dyn CrosswalkSink>, TaxbridgeError> {
    Ok(match kind {
        SinkKind::Sqlite => Box::new(SqliteSink::open(path)?),
        SinkKind::Tsv => Box::new(TsvSink::new(path)),
    })
}

pub fn run(args: MapArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;
    let quiet = args.quiet;

    let spinner = spinner_or_hidden("Loading internal taxonomy...", quiet);
    let (taxa, taxa_stats) = load_expanded_taxa(&args.taxa)?;
    spinner.set_message("Loading ColDP name usages...");
    let (candidates, name_stats) = load_name_usage(&args.name_usage)?;
    spinner.finish_and_clear();

    if !quiet {
        info(&format!(
            "Loaded {} taxa and {} name usages",
            format_number(taxa.len()),
            format_number(candidates.len())
        ));
        let skipped = taxa_stats.skipped + name_stats.skipped;
        if skipped > 0 {
            warning(&format!("Skipped {} malformed rows", format_number(skipped)));
        }
    }

    let chunk_size = config.performance.sink_chunk_size;
    let resolver = CrosswalkResolver::new(config).with_silent(quiet);
    let resolution = resolver.resolve(taxa, &candidates)?;

    let mut sink = open_sink(args.sink, &args.output)?;
    let spinner = spinner_or_hidden(&format!("Writing to {}...", sink.describe()), quiet);
    let stats = persist_matches(sink.as_mut(), &resolution.records, chunk_size)?;
    spinner.finish_and_clear();

    if let Some(path) = &args.report {
        resolution.report.write_json(path)?;
    }

    if !quiet {
        print_report(&resolution.report);
        println!();
        success(&format!(
            "Wrote {} mappings in {} chunks to {}",
            format_number(stats.records),
            stats.chunks,
            args.output.display()
        ));
        if let Some(path) = &args.report {
            info(&format!("Report saved to {}", path.display()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn args() -> MapArgs {
        MapArgs {
            taxa: PathBuf::from("expanded_taxa.tsv"),
            name_usage: PathBuf::from("NameUsage.tsv"),
            output: PathBuf::from("crosswalk.db"),
            sink: SinkKind::Sqlite,
            fuzzy: false,
            fuzzy_threshold: None,
            workers: None,
            batch_size: None,
            include_inactive: false,
            config: None,
            report: None,
            quiet: true,
        }
    }

    #[test]
    fn test_overrides_apply() {
        let mut args = args();
        args.fuzzy = true;
        args.fuzzy_threshold = Some(85.0);
        args.workers = Some(4);
        args.batch_size = Some(250);

        let config = build_config(&args).unwrap();
        assert!(config.matching.fuzzy_enabled);
        assert_eq!(config.matching.fuzzy_threshold, 85.0);
        assert_eq!(config.performance.workers, Some(4));
        assert_eq!(config.performance.batch_size, 250);
    }

    #[test]
    fn test_fuzzy_options_without_fuzzy_conflict() {
        let mut args = args();
        args.workers = Some(4);
        let err = build_config(&args).unwrap_err();
        assert!(matches!(err, TaxbridgeError::Configuration(_)));
        assert!(err.to_string().contains("--workers"));
    }

    #[test]
    fn test_fuzzy_enabled_from_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("taxbridge.toml");
        std::fs::write(&path, "[matching]\nfuzzy_enabled = true\n").unwrap();

        let mut args = args();
        args.config = Some(path);
        args.fuzzy_threshold = Some(95.0);
        let config = build_config(&args).unwrap();
        assert_eq!(config.matching.fuzzy_threshold, 95.0);
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut args = args();
        args.batch_size = Some(0);
        assert!(build_config(&args).is_err());
    }
}
