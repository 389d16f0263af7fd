/// Shared plumbing for the tab-separated exports both taxonomies ship as
use csv::{Reader, ReaderBuilder, StringRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use crate::{Result, TaxbridgeError};

/// Row accounting for a single loader pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadStats {
    pub rows: usize,
    pub loaded: usize,
    pub skipped: usize,
    /// Loaded rows where an unreadable field fell back to its default
    pub defaulted: usize,
}

impl LoadStats {
    pub fn record_loaded(&mut self) {
        self.rows += 1;
        self.loaded += 1;
    }

    pub fn record_skipped(&mut self) {
        self.rows += 1;
        self.skipped += 1;
    }

    pub fn record_defaulted(&mut self) {
        self.defaulted += 1;
    }
}

/// Open a TSV export without quote handling; ColDP fields contain bare quotes
pub fn open_tsv<P: AsRef<Path>>(path: P) -> Result<Reader<File>> {
    let file = File::open(path.as_ref())?;
    Ok(ReaderBuilder::new()
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .has_headers(true)
        .from_reader(file))
}

/// Header name to column position, with an optional prefix (e.g. `col:`) stripped
#[derive(Debug, Clone)]
pub struct Columns {
    index: HashMap<String, usize>,
}

impl Columns {
    pub fn from_headers(headers: &StringRecord, prefix: Option<&str>) -> Self {
        let index = headers
            .iter()
            .enumerate()
            .map(|(i, name)| {
                let name = name.trim();
                let name = prefix
                    .and_then(|p| name.strip_prefix(p))
                    .unwrap_or(name);
                (name.to_string(), i)
            })
            .collect();
        Self { index }
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub fn require(&self, name: &str, file: &Path) -> Result<usize> {
        self.position(name).ok_or_else(|| {
            TaxbridgeError::Parse(format!(
                "missing required column '{}' in {}",
                name,
                file.display()
            ))
        })
    }

    /// Non-empty, non-NA field value
    pub fn get<'r>(&self, record: &'r StringRecord, name: &str) -> Option<&'r str> {
        self.position(name).and_then(|i| field(record, i))
    }
}

/// Field at `index`, treating empty strings and NA markers as absent
pub fn field(record: &StringRecord, index: usize) -> Option<&str> {
    let value = record.get(index)?.trim();
    match value {
        "" | "NA" | "N/A" | "#N/A" => None,
        _ => Some(value),
    }
}

/// Lenient boolean parsing; `None` for anything unrecognised
pub fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "t" | "1" | "yes" => Some(true),
        "false" | "f" | "0" | "no" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("true", Some(true))]
    #[test_case("T", Some(true))]
    #[test_case("1", Some(true))]
    #[test_case("False", Some(false))]
    #[test_case("0", Some(false))]
    #[test_case("maybe", None)]
    fn test_parse_bool(input: &str, expected: Option<bool>) {
        assert_eq!(parse_bool(input), expected);
    }

    #[test]
    fn test_prefix_stripped_from_headers() {
        let headers = StringRecord::from(vec!["col:ID", "col:scientificName", "extra"]);
        let columns = Columns::from_headers(&headers, Some("col:"));
        assert_eq!(columns.position("ID"), Some(0));
        assert_eq!(columns.position("scientificName"), Some(1));
        assert_eq!(columns.position("extra"), Some(2));
    }

    #[test]
    fn test_na_markers_are_absent() {
        let record = StringRecord::from(vec!["", "NA", " Apidae "]);
        assert_eq!(field(&record, 0), None);
        assert_eq!(field(&record, 1), None);
        assert_eq!(field(&record, 2), Some("Apidae"));
        assert_eq!(field(&record, 9), None);
    }
}
