/// Common-name enrichment through the crosswalk
///
/// A source taxon's common name is the first qualifying vernacular name of
/// the ColDP usage it was matched to. Ancestor common names go through the
/// ancestors' own crosswalk entries, so an ancestor that never matched has
/// no common name even when its descendants do.
use csv::WriterBuilder;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::bio::coldp::VernacularName;
use crate::bio::taxonomy::{MajorRank, MatchRecord, SourceTaxon};
use crate::core::config::EnrichmentConfig;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonNameRow {
    pub taxon_id: i64,
    pub name: String,
    pub rank: String,
    pub common_name: Option<String>,
    /// Indexed like `MajorRank::ALL`
    pub ancestor_common_names: [Option<String>; 5],
}

impl CommonNameRow {
    pub fn ancestor(&self, rank: MajorRank) -> Option<&str> {
        self.ancestor_common_names[rank.index()].as_deref()
    }
}

/// Candidate ID to common name, first qualifying entry wins
pub fn index_common_names(
    vernacular: &[VernacularName],
    config: &EnrichmentConfig,
) -> HashMap<String, String> {
    let language = config.language.trim().to_lowercase();
    let mut index = HashMap::new();

    for entry in vernacular {
        if entry.language.as_deref() != Some(language.as_str()) {
            continue;
        }
        if config.preferred_only && entry.preferred != Some(true) {
            continue;
        }
        index
            .entry(entry.taxon_id.clone())
            .or_insert_with(|| entry.name.clone());
    }
    index
}

pub struct CommonNameResolver {
    crosswalk: HashMap<i64, String>,
    common_names: HashMap<String, String>,
}

impl CommonNameResolver {
    pub fn new(crosswalk: &[MatchRecord], vernacular: &[VernacularName], config: &EnrichmentConfig) -> Self {
        let crosswalk = crosswalk
            .iter()
            .map(|r| (r.source_taxon_id, r.candidate_id.clone()))
            .collect();
        Self {
            crosswalk,
            common_names: index_common_names(vernacular, config),
        }
    }

    /// Common name for a source taxon ID via its crosswalk entry
    pub fn common_name(&self, taxon_id: i64) -> Option<&str> {
        let candidate_id = self.crosswalk.get(&taxon_id)?;
        self.common_names.get(candidate_id).map(String::as_str)
    }

    pub fn row(&self, taxon: &SourceTaxon) -> CommonNameRow {
        let mut ancestor_common_names: [Option<String>; 5] = Default::default();
        for rank in MajorRank::ALL {
            ancestor_common_names[rank.index()] = taxon
                .ancestry
                .taxon_id(rank)
                .and_then(|id| self.common_name(id))
                .map(str::to_string);
        }

        CommonNameRow {
            taxon_id: taxon.taxon_id,
            name: taxon.name.clone(),
            rank: taxon.rank.clone(),
            common_name: self.common_name(taxon.taxon_id).map(str::to_string),
            ancestor_common_names,
        }
    }

    /// One row per taxon, sorted by taxon ID
    pub fn rows(&self, taxa: &[SourceTaxon]) -> Vec<CommonNameRow> {
        let mut rows: Vec<CommonNameRow> = taxa.iter().map(|t| self.row(t)).collect();
        rows.sort_by_key(|r| r.taxon_id);
        rows
    }
}

pub fn common_names_header() -> Vec<String> {
    let mut header = vec![
        "taxonID".to_string(),
        "name".to_string(),
        "rank".to_string(),
        "commonName".to_string(),
    ];
    header.extend(
        MajorRank::ALL
            .iter()
            .map(|rank| format!("L{}_commonName", rank.level())),
    );
    header
}

/// Rewrite `path` with `rows`; returns how many rows carry a common name.
pub fn write_common_names_tsv<P: AsRef<Path>>(path: P, rows: &[CommonNameRow]) -> Result<usize> {
    let path = path.as_ref();
    let file = File::create(path)?;
    let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(file);
    writer.write_record(common_names_header())?;

    let mut named = 0;
    for row in rows {
        if row.common_name.is_some() {
            named += 1;
        }
        let mut fields = vec![
            row.taxon_id.to_string(),
            row.name.clone(),
            row.rank.clone(),
            row.common_name.clone().unwrap_or_default(),
        ];
        fields.extend(
            row.ancestor_common_names
                .iter()
                .map(|name| name.clone().unwrap_or_default()),
        );
        writer.write_record(&fields)?;
    }
    writer.flush()?;

    info!(
        "Wrote {} rows to {} ({} with a common name)",
        rows.len(),
        path.display(),
        named
    );
    Ok(named)
}
