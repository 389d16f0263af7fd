/// Tab-separated crosswalk file sink
use csv::{ReaderBuilder, WriterBuilder};
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::bio::taxonomy::{MatchRecord, MatchType};
use crate::bio::tsv::{Columns, LoadStats};
use crate::storage::traits::CrosswalkSink;
use crate::{Result, TaxbridgeError};

pub const CROSSWALK_HEADER: [&str; 6] = [
    "source_taxon_id",
    "col_taxon_id",
    "match_type",
    "match_score",
    "source_scientific_name",
    "col_scientific_name",
];

/// Writes the crosswalk as TSV. `clear` truncates the file and writes the
/// header; each `append` writes and flushes one chunk.
pub struct TsvSink {
    path: PathBuf,
}

impl TsvSink {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CrosswalkSink for TsvSink {
    fn clear(&mut self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let file = File::create(&self.path)?;
        let mut writer = WriterBuilder::new().delimiter(b'\t').from_writer(file);
        writer.write_record(CROSSWALK_HEADER)?;
        writer.flush()?;
        Ok(())
    }

    fn append(&mut self, chunk: &[MatchRecord]) -> Result<()> {
        let file = OpenOptions::new().append(true).open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_writer(file);

        for record in chunk {
            writer.write_record([
                record.source_taxon_id.to_string().as_str(),
                record.candidate_id.as_str(),
                record.match_type.as_str(),
                record.match_score.to_string().as_str(),
                record.source_name.as_str(),
                record.candidate_name.as_str(),
            ])?;
        }
        writer.flush()?;
        Ok(())
    }

    fn describe(&self) -> String {
        format!("TSV file {}", self.path.display())
    }
}

/// Read a crosswalk TSV written by [`TsvSink`]
pub fn read_crosswalk_tsv<P: AsRef<Path>>(path: P) -> Result<(Vec<MatchRecord>, LoadStats)> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_reader(File::open(path)?);
    let columns = Columns::from_headers(reader.headers()?, None);

    let positions = CROSSWALK_HEADER
        .iter()
        .map(|name| columns.require(name, path))
        .collect::<Result<Vec<_>>>()?;

    let mut records = Vec::new();
    let mut stats = LoadStats::default();

    for (line, result) in reader.records().enumerate() {
        let row = result?;
        let get = |i: usize| row.get(positions[i]).unwrap_or_default();

        let parsed = (
            get(0).parse::<i64>(),
            MatchType::parse(get(2)),
            get(3).parse::<f64>(),
        );
        match parsed {
            (Ok(source_taxon_id), Some(match_type), Ok(match_score)) => {
                records.push(MatchRecord {
                    source_taxon_id,
                    candidate_id: get(1).to_string(),
                    match_type,
                    match_score,
                    source_name: get(4).to_string(),
                    candidate_name: get(5).to_string(),
                });
                stats.record_loaded();
            }
            _ => {
                warn!("{}: skipping unreadable crosswalk row {}", path.display(), line + 2);
                stats.record_skipped();
            }
        }
    }

    if stats.loaded == 0 && stats.skipped > 0 {
        return Err(TaxbridgeError::Parse(format!(
            "no readable crosswalk rows in {}",
            path.display()
        )));
    }

    Ok((records, stats))
}
