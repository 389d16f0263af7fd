/// Crosswalk pipeline: exact passes, optional fuzzy stage, persistence
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::bio::taxonomy::{CandidateTaxon, MatchRecord, SourceTaxon};
use crate::core::config::Config;
use crate::core::exact::ExactMatcher;
use crate::core::fuzzy::FuzzyContext;
use crate::core::lineage::LineageIndex;
use crate::core::report::ResolutionReport;
use crate::core::scheduler::MatchScheduler;
use crate::storage::traits::{CandidateSource, CrosswalkSink, TaxonSource};
use crate::storage::writer::{persist_matches, PersistStats};
use crate::Result;

/// Final crosswalk, sorted by source taxon ID, with its summary
#[derive(Debug, Clone)]
pub struct Resolution {
    pub records: Vec<MatchRecord>,
    pub report: ResolutionReport,
}

pub struct CrosswalkResolver {
    config: Config,
    silent: bool,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl CrosswalkResolver {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            silent: false,
            cancel_flag: None,
        }
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Taxa that take part in matching: active ones (unless inactive taxa
    /// are included) whose names survive normalization.
    fn select_taxa(&self, taxa: Vec<SourceTaxon>) -> Vec<SourceTaxon> {
        let include_inactive = self.config.matching.include_inactive;
        taxa.into_iter()
            .filter(|t| include_inactive || t.active)
            .filter(|t| t.normalized_name().is_some())
            .collect()
    }

    pub fn resolve(&self, taxa: Vec<SourceTaxon>, candidates: &[CandidateTaxon]) -> Result<Resolution> {
        self.config.validate()?;
        let start = Instant::now();
        let mut report = ResolutionReport::new(taxa.len(), candidates.len());

        let taxa = self.select_taxa(taxa);
        report.considered_taxa = taxa.len();
        info!(
            "Matching {} of {} source taxa against {} candidates",
            report.considered_taxa, report.source_taxa, report.candidate_taxa
        );

        let exact = ExactMatcher::new(candidates).resolve(taxa);
        let mut records = exact.matches;

        let matching = &self.config.matching;
        if !matching.fuzzy_enabled {
            debug!("Fuzzy stage disabled; {} taxa left unmatched", exact.unmatched.len());
        } else if exact.unmatched.is_empty() {
            info!("No taxa left for fuzzy matching.");
        } else {
            report.fuzzy_enabled = true;
            info!("Building lineage index for homonym resolution...");
            let lineage = LineageIndex::build(&exact.unmatched, candidates);
            debug!(
                "Lineage index: {} source taxa, {} candidates",
                lineage.source_len(),
                lineage.candidate_len()
            );

            let context = FuzzyContext::new(candidates, lineage, matching);
            let mut scheduler = MatchScheduler::new(
                self.config.performance.batch_size,
                self.config.worker_count(),
            )
            .with_silent(self.silent);
            if let Some(flag) = &self.cancel_flag {
                scheduler = scheduler.with_cancel_flag(Arc::clone(flag));
            }

            let outcome = scheduler.run(&context, &exact.unmatched)?;
            report.batches = outcome.batches;
            report.workers = outcome.workers;
            records.extend(outcome.records);
        }

        records.sort_by_key(|r| r.source_taxon_id);
        report.tally(&records);
        report.elapsed_secs = start.elapsed().as_secs_f64();

        info!("Match statistics:");
        for (match_type, count) in report.match_types.iter().filter(|(_, c)| **c > 0) {
            info!("  {}: {}", match_type, count);
        }
        info!(
            "{} matched, {} unmatched in {:.2}s",
            report.total_matches(),
            report.unmatched,
            report.elapsed_secs
        );

        Ok(Resolution { records, report })
    }

    /// Load both taxonomies, resolve, and rewrite `sink` with the result.
    pub fn run<T, C, S>(&self, source: &T, candidates: &C, sink: &mut S) -> Result<(Resolution, PersistStats)>
    where
        T: TaxonSource + ?Sized,
        C: CandidateSource + ?Sized,
        S: CrosswalkSink + ?Sized,
    {
        self.config.validate()?;

        info!("Loading source taxa...");
        let taxa = source.load_taxa()?;
        info!("Loading candidate name usages...");
        let candidates = candidates.load_candidates()?;

        let resolution = self.resolve(taxa, &candidates)?;
        let stats = persist_matches(sink, &resolution.records, self.config.performance.sink_chunk_size)?;
        Ok((resolution, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::taxonomy::{MatchType, TaxonomicStatus};
    use crate::storage::memory::MemorySink;
    use crate::TaxbridgeError;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::Ordering;

    fn candidates() -> Vec<CandidateTaxon> {
        vec![
            CandidateTaxon::new("C1", "Apis mellifera", "species", TaxonomicStatus::Accepted),
            CandidateTaxon::new("C2", "Bombus spp", "species", TaxonomicStatus::Accepted),
        ]
    }

    fn fuzzy_config() -> Config {
        let mut config = Config::default();
        config.matching.fuzzy_enabled = true;
        config.performance.workers = Some(2);
        config
    }

    #[test]
    fn test_exact_only_by_default() {
        let taxa = vec![
            SourceTaxon::new(2, "Bombus sp", "species"),
            SourceTaxon::new(1, "Apis mellifera", "species"),
        ];
        let resolution = CrosswalkResolver::new(Config::default())
            .with_silent(true)
            .resolve(taxa, &candidates())
            .unwrap();

        assert_eq!(resolution.records.len(), 1);
        assert_eq!(resolution.records[0].source_taxon_id, 1);
        assert_eq!(resolution.report.unmatched, 1);
        assert!(!resolution.report.fuzzy_enabled);
    }

    #[test]
    fn test_fuzzy_stage_and_ordering() {
        let taxa = vec![
            SourceTaxon::new(2, "Bombus sp", "species"),
            SourceTaxon::new(1, "Apis mellifera", "species"),
        ];
        let resolution = CrosswalkResolver::new(fuzzy_config())
            .with_silent(true)
            .resolve(taxa, &candidates())
            .unwrap();

        let ids: Vec<i64> = resolution.records.iter().map(|r| r.source_taxon_id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(resolution.records[1].match_type, MatchType::FuzzyNameSingleMatch);
        assert_eq!(resolution.records[1].candidate_id, "C2");
        assert_eq!(resolution.report.exact_matches, 1);
        assert_eq!(resolution.report.fuzzy_matches, 1);
        assert_eq!(resolution.report.batches, 1);
    }

    #[test]
    fn test_inactive_taxa_skipped_unless_included() {
        let taxa = || vec![SourceTaxon::new(1, "Apis mellifera", "species").inactive()];

        let resolution = CrosswalkResolver::new(Config::default())
            .resolve(taxa(), &candidates())
            .unwrap();
        assert!(resolution.records.is_empty());
        assert_eq!(resolution.report.considered_taxa, 0);

        let mut config = Config::default();
        config.matching.include_inactive = true;
        let resolution = CrosswalkResolver::new(config)
            .resolve(taxa(), &candidates())
            .unwrap();
        assert_eq!(resolution.records.len(), 1);
    }

    #[test]
    fn test_invalid_config_fails_before_matching() {
        let mut config = Config::default();
        config.performance.batch_size = 0;
        let result = CrosswalkResolver::new(config).resolve(Vec::new(), &[]);
        assert!(matches!(result, Err(TaxbridgeError::Configuration(_))));
    }

    #[test]
    fn test_cancelled_run_persists_nothing() {
        let flag = Arc::new(AtomicBool::new(false));
        let resolver = CrosswalkResolver::new(fuzzy_config())
            .with_silent(true)
            .with_cancel_flag(Arc::clone(&flag));
        flag.store(true, Ordering::Relaxed);

        let taxa = vec![SourceTaxon::new(2, "Bombus sp", "species")];
        let mut sink = MemorySink::new();
        let result = resolver.run(&taxa, &candidates(), &mut sink);
        assert!(matches!(result, Err(TaxbridgeError::Cancelled)));
        assert!(sink.records().is_empty());
        assert_eq!(sink.chunks_appended(), 0);
    }

    #[test]
    fn test_run_persists_records() {
        let taxa = vec![SourceTaxon::new(1, "Apis mellifera", "species")];
        let mut sink = MemorySink::new();
        let (resolution, stats) = CrosswalkResolver::new(Config::default())
            .run(&taxa, &candidates(), &mut sink)
            .unwrap();

        assert_eq!(stats.records, 1);
        assert_eq!(stats.chunks, 1);
        assert_eq!(sink.records(), resolution.records.as_slice());
        assert_eq!(sink.into_records(), resolution.records);
    }
}
