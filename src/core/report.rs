/// Summary of one crosswalk run
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::bio::taxonomy::{MatchRecord, MatchType};
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionReport {
    pub generated_at: DateTime<Utc>,
    /// Source taxa loaded, before the active filter
    pub source_taxa: usize,
    /// Source taxa that entered matching
    pub considered_taxa: usize,
    pub candidate_taxa: usize,
    pub exact_matches: usize,
    pub fuzzy_matches: usize,
    pub unmatched: usize,
    /// Every match type in a fixed order, zero counts included
    pub match_types: IndexMap<MatchType, usize>,
    pub fuzzy_enabled: bool,
    pub batches: usize,
    pub workers: usize,
    pub elapsed_secs: f64,
}

impl ResolutionReport {
    pub fn new(source_taxa: usize, candidate_taxa: usize) -> Self {
        Self {
            generated_at: Utc::now(),
            source_taxa,
            considered_taxa: 0,
            candidate_taxa,
            exact_matches: 0,
            fuzzy_matches: 0,
            unmatched: 0,
            match_types: MatchType::ALL.into_iter().map(|t| (t, 0)).collect(),
            fuzzy_enabled: false,
            batches: 0,
            workers: 0,
            elapsed_secs: 0.0,
        }
    }

    /// Recount matches from the final record set.
    pub fn tally(&mut self, records: &[MatchRecord]) {
        for count in self.match_types.values_mut() {
            *count = 0;
        }
        for record in records {
            *self.match_types.entry(record.match_type).or_insert(0) += 1;
        }
        self.exact_matches = records.iter().filter(|r| r.match_type.is_exact()).count();
        self.fuzzy_matches = records.len() - self.exact_matches;
        self.unmatched = self.considered_taxa.saturating_sub(records.len());
    }

    pub fn total_matches(&self) -> usize {
        self.exact_matches + self.fuzzy_matches
    }

    /// Share of considered taxa that received a match, in percent
    pub fn match_rate(&self) -> f64 {
        if self.considered_taxa == 0 {
            return 0.0;
        }
        self.total_matches() as f64 / self.considered_taxa as f64 * 100.0
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::taxonomy::{CandidateTaxon, SourceTaxon, TaxonomicStatus};
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn record(id: i64, match_type: MatchType) -> MatchRecord {
        let source = SourceTaxon::new(id, "Apis mellifera", "species");
        let candidate = CandidateTaxon::new("C1", "Apis mellifera", "species", TaxonomicStatus::Accepted);
        MatchRecord::new(&source, &candidate, match_type, 1.0)
    }

    #[test]
    fn test_tally() {
        let mut report = ResolutionReport::new(12, 40);
        report.considered_taxa = 10;
        report.tally(&[
            record(1, MatchType::ExactNameRankAccepted),
            record(2, MatchType::ExactNameRankAccepted),
            record(3, MatchType::ExactNameOnlyOtherStatus),
            record(4, MatchType::FuzzyNameHighestScore),
        ]);

        assert_eq!(report.exact_matches, 3);
        assert_eq!(report.fuzzy_matches, 1);
        assert_eq!(report.unmatched, 6);
        assert_eq!(report.match_types[&MatchType::ExactNameRankAccepted], 2);
        assert_eq!(report.match_types[&MatchType::FuzzyNameNoAncestors], 0);
        assert_eq!(report.match_types.len(), 8);
        assert!((report.match_rate() - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_json_keeps_type_order() {
        let mut report = ResolutionReport::new(1, 1);
        report.considered_taxa = 1;
        report.tally(&[record(1, MatchType::FuzzyNameSingleMatch)]);

        let json = report.to_json().unwrap();
        let first = json.find("exact_name_rank_accepted").unwrap();
        let last = json.find("fuzzy_name_no_ancestors").unwrap();
        assert!(first < last);

        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.json");
        report.write_json(&path).unwrap();
        let loaded: ResolutionReport =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(loaded, report);
    }
}
