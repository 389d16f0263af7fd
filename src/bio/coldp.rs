/// Catalogue of Life Data Package (ColDP) table loaders
///
/// ColDP ships each entity as a TSV whose headers carry a `col:` prefix
/// (`col:ID`, `col:scientificName`, ...). Only the fields needed for the
/// crosswalk and common-name enrichment are read.
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::bio::taxonomy::{CandidateTaxon, Classification, MajorRank, TaxonomicStatus};
use crate::bio::tsv::{field, open_tsv, parse_bool, Columns, LoadStats};
use crate::Result;

pub const COLDP_PREFIX: &str = "col:";

/// ColDP field carrying the classification name for each major rank
fn classification_field(rank: MajorRank) -> &'static str {
    match rank {
        MajorRank::Genus => "genericName",
        MajorRank::Family => "family",
        MajorRank::Order => "order",
        MajorRank::Class => "class",
        MajorRank::Phylum => "phylum",
    }
}

/// Read `NameUsage.tsv`. Rows without an ID are skipped.
pub fn load_name_usage<P: AsRef<Path>>(path: P) -> Result<(Vec<CandidateTaxon>, LoadStats)> {
    let path = path.as_ref();
    let mut reader = open_tsv(path)?;
    let columns = Columns::from_headers(reader.headers()?, Some(COLDP_PREFIX));

    let id_col = columns.require("ID", path)?;
    let name_col = columns.require("scientificName", path)?;
    let rank_col = columns.position("rank");
    let status_col = columns.position("status");

    let mut candidates = Vec::new();
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

        let Some(id) = field(&record, id_col) else {
            warn!("{}: skipping row {} without ID", path.display(), line + 2);
            stats.record_skipped();
            continue;
        };

        let mut classification = Classification::default();
        for rank in MajorRank::ALL {
            let name = columns
                .get(&record, classification_field(rank))
                .map(str::to_string);
            classification.set(rank, name);
        }

        candidates.push(CandidateTaxon {
            id: id.to_string(),
            name: field(&record, name_col).unwrap_or_default().to_string(),
            rank: rank_col
                .and_then(|i| field(&record, i))
                .unwrap_or_default()
                .to_string(),
            status: status_col
                .and_then(|i| field(&record, i))
                .map(TaxonomicStatus::parse)
                .unwrap_or_else(|| TaxonomicStatus::Other(String::new())),
            classification,
        });
        stats.record_loaded();
    }

    info!(
        "Loaded {} ColDP name usages from {} ({} rows skipped)",
        stats.loaded,
        path.display(),
        stats.skipped
    );
    Ok((candidates, stats))
}

/// A ColDP vernacular (common) name attached to a name usage
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VernacularName {
    pub taxon_id: String,
    pub name: String,
    pub language: Option<String>,
    pub preferred: Option<bool>,
}

impl VernacularName {
    pub fn new(taxon_id: &str, name: &str, language: &str, preferred: bool) -> Self {
        Self {
            taxon_id: taxon_id.to_string(),
            name: name.to_string(),
            language: Some(language.to_string()),
            preferred: Some(preferred),
        }
    }
}

/// Read `VernacularName.tsv`. Rows missing the taxon or the name are skipped.
pub fn load_vernacular_names<P: AsRef<Path>>(
    path: P,
) -> Result<(Vec<VernacularName>, LoadStats)> {
    let path = path.as_ref();
    let mut reader = open_tsv(path)?;
    let columns = Columns::from_headers(reader.headers()?, Some(COLDP_PREFIX));

    let taxon_col = columns.require("taxonID", path)?;
    let name_col = columns.require("name", path)?;

    let mut names = Vec::new();
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

        let (Some(taxon_id), Some(name)) = (field(&record, taxon_col), field(&record, name_col))
        else {
            stats.record_skipped();
            continue;
        };

        names.push(VernacularName {
            taxon_id: taxon_id.to_string(),
            name: name.to_string(),
            language: columns.get(&record, "language").map(str::to_lowercase),
            preferred: columns.get(&record, "preferred").and_then(parse_bool),
        });
        stats.record_loaded();
    }

    info!(
        "Loaded {} vernacular names from {} ({} rows skipped)",
        stats.loaded,
        path.display(),
        stats.skipped
    );
    Ok((names, stats))
}

/// `CandidateSource` backed by a ColDP `NameUsage.tsv`
#[derive(Debug, Clone)]
pub struct NameUsageFile {
    path: PathBuf,
}

impl NameUsageFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl crate::storage::traits::CandidateSource for NameUsageFile {
    fn load_candidates(&self) -> Result<Vec<CandidateTaxon>> {
        load_name_usage(&self.path).map(|(candidates, _)| candidates)
    }
}
