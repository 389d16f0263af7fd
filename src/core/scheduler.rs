/// Batch scheduler for the fuzzy stage
///
/// Residual taxa are split into fixed-size batches and matched on a
/// dedicated rayon pool. Batches share the fuzzy context read-only and
/// return owned record lists; results are concatenated in batch order once
/// every batch has finished, so the outcome does not depend on batch size or
/// worker count.
use rayon::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::bio::taxonomy::{MatchRecord, SourceTaxon};
use crate::core::fuzzy::FuzzyContext;
use crate::utils::parallel::{batch_count, build_worker_pool};
use crate::utils::progress::progress_bar_or_hidden;
use crate::{Result, TaxbridgeError};

#[derive(Debug, Clone, Default)]
pub struct ScheduleOutcome {
    pub records: Vec<MatchRecord>,
    pub batches: usize,
    pub workers: usize,
}

pub struct MatchScheduler {
    batch_size: usize,
    workers: usize,
    silent: bool,
    cancel_flag: Option<Arc<AtomicBool>>,
}

impl MatchScheduler {
    pub fn new(batch_size: usize, workers: usize) -> Self {
        Self {
            batch_size,
            workers,
            silent: false,
            cancel_flag: None,
        }
    }

    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Flag checked before each batch starts; setting it aborts the run.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel_flag = Some(flag);
        self
    }

    fn is_cancelled(&self) -> bool {
        self.cancel_flag
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn run(&self, context: &FuzzyContext, residual: &[SourceTaxon]) -> Result<ScheduleOutcome> {
        if self.batch_size == 0 {
            return Err(TaxbridgeError::Configuration(
                "batch size must be greater than zero".to_string(),
            ));
        }
        if self.is_cancelled() {
            return Err(TaxbridgeError::Cancelled);
        }
        if residual.is_empty() {
            return Ok(ScheduleOutcome {
                workers: self.workers,
                ..Default::default()
            });
        }

        let batches = batch_count(residual.len(), self.batch_size);
        let pool = build_worker_pool(self.workers)
            .map_err(|e| TaxbridgeError::Other(format!("Failed to build worker pool: {}", e)))?;
        let workers = pool.current_num_threads();

        info!(
            "Starting fuzzy matching for {} taxa using {} workers...",
            residual.len(),
            workers
        );
        let start = Instant::now();
        let pb = progress_bar_or_hidden(residual.len() as u64, "Fuzzy matching", self.silent);

        let per_batch: Result<Vec<Vec<MatchRecord>>> = pool.install(|| {
            residual
                .par_chunks(self.batch_size)
                .enumerate()
                .map(|(i, batch)| {
                    if self.is_cancelled() {
                        return Err(TaxbridgeError::Cancelled);
                    }
                    let matches = context.match_batch(batch);
                    debug!(
                        "Batch {}/{}: {} of {} taxa matched",
                        i + 1,
                        batches,
                        matches.len(),
                        batch.len()
                    );
                    pb.inc(batch.len() as u64);
                    Ok(matches)
                })
                .collect()
        });

        let per_batch = match per_batch {
            Ok(per_batch) => per_batch,
            Err(e) => {
                pb.abandon_with_message("Fuzzy matching cancelled");
                warn!("Fuzzy stage stopped: {}", e);
                return Err(e);
            }
        };
        pb.finish_and_clear();

        let records: Vec<MatchRecord> = per_batch.into_iter().flatten().collect();
        info!(
            "Fuzzy matching complete: {} matches from {} batches in {:.2?}",
            records.len(),
            batches,
            start.elapsed()
        );

        Ok(ScheduleOutcome {
            records,
            batches,
            workers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bio::taxonomy::{CandidateTaxon, TaxonomicStatus};
    use crate::core::config::MatchingConfig;
    use crate::core::lineage::LineageIndex;
    use pretty_assertions::assert_eq;

    fn context() -> FuzzyContext {
        let candidates = vec![
            CandidateTaxon::new("A1", "Apis mellifera", "species", TaxonomicStatus::Accepted),
            CandidateTaxon::new("V1", "Vespa crabro", "species", TaxonomicStatus::Accepted),
        ];
        FuzzyContext::new(&candidates, LineageIndex::default(), &MatchingConfig::default())
    }

    fn residual(n: i64) -> Vec<SourceTaxon> {
        (0..n)
            .map(|i| {
                let name = match i % 3 {
                    0 => "Apis  mellifera",
                    1 => "Vespa crabro",
                    _ => "Quercus robur",
                };
                SourceTaxon::new(i, name, "subspecies")
            })
            .collect()
    }

    #[test]
    fn test_batch_size_does_not_change_matches() {
        let context = context();
        let taxa = residual(25);

        let single = MatchScheduler::new(100, 1)
            .with_silent(true)
            .run(&context, &taxa)
            .unwrap();
        let split = MatchScheduler::new(4, 3)
            .with_silent(true)
            .run(&context, &taxa)
            .unwrap();

        assert_eq!(single.batches, 1);
        assert_eq!(split.batches, 7);
        assert_eq!(single.records, split.records);
        // two of every three names have a candidate
        assert_eq!(single.records.len(), 17);
    }

    #[test]
    fn test_empty_residual() {
        let outcome = MatchScheduler::new(10, 2)
            .with_silent(true)
            .run(&context(), &[])
            .unwrap();
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.batches, 0);
    }

    #[test]
    fn test_cancelled_before_start() {
        let flag = Arc::new(AtomicBool::new(true));
        let result = MatchScheduler::new(10, 1)
            .with_silent(true)
            .with_cancel_flag(flag)
            .run(&context(), &residual(5));
        assert!(matches!(result, Err(TaxbridgeError::Cancelled)));
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let result = MatchScheduler::new(0, 1).run(&context(), &residual(1));
        assert!(matches!(result, Err(TaxbridgeError::Configuration(_))));
    }
}
