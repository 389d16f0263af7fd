/// Loader for the internal taxonomy's denormalized `expanded_taxa` export
///
/// Only the columns the resolver needs are read: identity, name, rank,
/// active flag, and the `L{level}_taxonID` / `L{level}_name` ancestor pairs
/// for the major ranks. Any other ancestor levels in the file are ignored.
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::bio::taxonomy::{Ancestry, MajorRank, SourceTaxon};
use crate::bio::tsv::{field, open_tsv, parse_bool, Columns, LoadStats};
use crate::Result;

/// Column positions for one major rank's ancestor pair
#[derive(Debug, Clone, Copy)]
struct AncestorColumns {
    rank: MajorRank,
    taxon_id: Option<usize>,
    name: Option<usize>,
}

fn ancestor_columns(columns: &Columns) -> Vec<AncestorColumns> {
    MajorRank::ALL
        .iter()
        .map(|&rank| AncestorColumns {
            rank,
            taxon_id: columns.position(&format!("L{}_taxonID", rank.level())),
            name: columns.position(&format!("L{}_name", rank.level())),
        })
        .collect()
}

/// Read every taxon from an `expanded_taxa` TSV export.
///
/// Rows with an unparseable `taxonID` are logged and skipped. A missing
/// `taxonActive` is treated as active; an unreadable one is logged, counted
/// in `LoadStats::defaulted`, and also treated as active.
pub fn load_expanded_taxa<P: AsRef<Path>>(path: P) -> Result<(Vec<SourceTaxon>, LoadStats)> {
    let path = path.as_ref();
    let mut reader = open_tsv(path)?;
    let columns = Columns::from_headers(reader.headers()?, None);

    let id_col = columns.require("taxonID", path)?;
    let name_col = columns.require("name", path)?;
    let rank_col = columns.require("rank", path)?;
    let active_col = columns.position("taxonActive");
    let lineage_cols = ancestor_columns(&columns);

    if lineage_cols.iter().all(|c| c.name.is_none()) {
        warn!(
            "{} has no major-rank ancestor columns; homonyms cannot be disambiguated by lineage",
            path.display()
        );
    }

    let mut taxa = Vec::new();
    let mut stats = LoadStats::default();

    for (line, result) in reader.records().enumerate() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                warn!("{}: skipping malformed row {}: {}", path.display(), line + 2, e);
                stats.record_skipped();
                continue;
            }
        };

        let taxon_id = match field(&record, id_col).map(str::parse::<i64>) {
            Some(Ok(id)) => id,
            other => {
                warn!(
                    "{}: skipping row {} with invalid taxonID {:?}",
                    path.display(),
                    line + 2,
                    other.and_then(|r| r.err()).map(|e| e.to_string())
                );
                stats.record_skipped();
                continue;
            }
        };

        let active = match active_col.and_then(|i| field(&record, i)) {
            None => true,
            Some(value) => parse_bool(value).unwrap_or_else(|| {
                warn!(
                    "{}: unreadable taxonActive {:?} for taxon {} at row {}, treating as active",
                    path.display(),
                    value,
                    taxon_id,
                    line + 2
                );
                stats.record_defaulted();
                true
            }),
        };

        let mut ancestry = Ancestry::new();
        for cols in &lineage_cols {
            let ancestor_id = cols
                .taxon_id
                .and_then(|i| field(&record, i))
                .and_then(|v| parse_level_id(v));
            let ancestor_name = cols.name.and_then(|i| field(&record, i)).map(str::to_string);
            ancestry.set(cols.rank, ancestor_id, ancestor_name);
        }

        taxa.push(SourceTaxon {
            taxon_id,
            name: field(&record, name_col).unwrap_or_default().to_string(),
            rank: field(&record, rank_col).unwrap_or_default().to_string(),
            active,
            ancestry,
        });
        stats.record_loaded();
    }

    info!(
        "Loaded {} taxa from {} ({} rows skipped)",
        stats.loaded,
        path.display(),
        stats.skipped
    );
    Ok((taxa, stats))
}

/// Ancestor ids are sometimes exported as floats ("52775.0") by upstream tools
fn parse_level_id(value: &str) -> Option<i64> {
    value.parse::<i64>().ok().or_else(|| {
        let parsed = value.parse::<f64>().ok()?;
        if parsed.fract() == 0.0 {
            Some(parsed as i64)
        } else {
            debug!("ignoring non-integral ancestor id {}", value);
            None
        }
    })
}

/// `TaxonSource` backed by an `expanded_taxa` TSV file
#[derive(Debug, Clone)]
pub struct ExpandedTaxaFile {
    path: PathBuf,
}

impl ExpandedTaxaFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl crate::storage::traits::TaxonSource for ExpandedTaxaFile {
    fn load_taxa(&self) -> Result<Vec<SourceTaxon>> {
        load_expanded_taxa(&self.path).map(|(taxa, _)| taxa)
    }
}
