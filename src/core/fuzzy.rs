/// Fuzzy-name stage with homonym resolution by lineage
///
/// Each query is scored against the accepted-status name pool first and
/// against every candidate name only when the accepted pool yields nothing.
/// Matched names expand to every candidate record carrying that name, so
/// homonyms reach `resolve_homonyms` together.
use std::collections::{HashMap, HashSet};

use crate::bio::taxonomy::{CandidateTaxon, MatchRecord, MatchType, SourceTaxon};
use crate::core::config::MatchingConfig;
use crate::core::lineage::LineageIndex;
use crate::core::similarity::{extract_top, Choice, Scorer};

/// Read-only state shared by every fuzzy batch
pub struct FuzzyContext {
    accepted_pool: Vec<Choice>,
    all_pool: Vec<Choice>,
    by_name: HashMap<String, Vec<CandidateTaxon>>,
    lineage: LineageIndex,
    scorer: Scorer,
    threshold: f64,
    homonym_cutoff: f64,
    max_candidates: usize,
}

fn push_unique(pool: &mut Vec<Choice>, seen: &mut HashSet<String>, name: &str) {
    if seen.insert(name.to_string()) {
        pool.push(Choice::new(name.to_string()));
    }
}

impl FuzzyContext {
    pub fn new(candidates: &[CandidateTaxon], lineage: LineageIndex, config: &MatchingConfig) -> Self {
        let mut accepted_pool = Vec::new();
        let mut all_pool = Vec::new();
        let mut accepted_seen = HashSet::new();
        let mut all_seen = HashSet::new();
        let mut by_name: HashMap<String, Vec<CandidateTaxon>> = HashMap::new();

        for candidate in candidates {
            let Some(name) = candidate.normalized_name() else {
                continue;
            };
            if candidate.status.is_accepted() {
                push_unique(&mut accepted_pool, &mut accepted_seen, &name);
            }
            push_unique(&mut all_pool, &mut all_seen, &name);
            by_name.entry(name).or_default().push(candidate.clone());
        }

        Self {
            accepted_pool,
            all_pool,
            by_name,
            lineage,
            scorer: config.scorer,
            threshold: config.fuzzy_threshold,
            homonym_cutoff: config.homonym_cutoff,
            max_candidates: config.max_candidates,
        }
    }

    pub fn accepted_pool_len(&self) -> usize {
        self.accepted_pool.len()
    }

    pub fn all_pool_len(&self) -> usize {
        self.all_pool.len()
    }

    /// Candidate records paired with the similarity of their name to `query`
    pub fn scored_candidates(&self, query: &str) -> Vec<(&CandidateTaxon, f64)> {
        let mut pool = &self.accepted_pool;
        let mut hits = extract_top(query, pool, self.scorer, self.threshold, self.max_candidates);
        if hits.is_empty() {
            pool = &self.all_pool;
            hits = extract_top(query, pool, self.scorer, self.threshold, self.max_candidates);
        }

        hits.into_iter()
            .flat_map(|(idx, score)| {
                self.by_name
                    .get(&pool[idx].name)
                    .into_iter()
                    .flatten()
                    .map(move |candidate| (candidate, score))
            })
            .collect()
    }

    /// Resolve one residual taxon, or `None` when nothing decisive survives
    pub fn match_taxon(&self, taxon: &SourceTaxon) -> Option<MatchRecord> {
        let query = taxon.normalized_name()?;
        let scored = self.scored_candidates(&query);
        if scored.is_empty() {
            return None;
        }
        resolve_homonyms(taxon, &scored, &self.lineage, self.homonym_cutoff)
    }

    pub fn match_batch(&self, batch: &[SourceTaxon]) -> Vec<MatchRecord> {
        batch.iter().filter_map(|taxon| self.match_taxon(taxon)).collect()
    }
}

/// Pick at most one candidate from `scored` for `source`.
///
/// Only pairs scoring strictly above `cutoff` are considered. A lone
/// survivor is accepted without looking at lineage. Otherwise the survivor
/// with the highest lineage agreement wins, similarity breaking ties, and
/// earlier entries in `scored` winning exact ties.
pub fn resolve_homonyms(
    source: &SourceTaxon,
    scored: &[(&CandidateTaxon, f64)],
    lineage: &LineageIndex,
    cutoff: f64,
) -> Option<MatchRecord> {
    let survivors: Vec<(&CandidateTaxon, f64)> = scored
        .iter()
        .copied()
        .filter(|(_, score)| *score > cutoff)
        .collect();

    match survivors.as_slice() {
        [] => return None,
        [(candidate, score)] => {
            return Some(MatchRecord::new(
                source,
                candidate,
                MatchType::FuzzyNameSingleMatch,
                score / 100.0,
            ));
        }
        _ => {}
    }

    let Some(source_lineage) = lineage.source_lineage(source.taxon_id) else {
        let (candidate, score) = survivors
            .iter()
            .copied()
            .reduce(|best, next| if next.1 > best.1 { next } else { best })?;
        return Some(MatchRecord::new(
            source,
            candidate,
            MatchType::FuzzyNameHighestScore,
            score / 100.0,
        ));
    };

    let (candidate, score, weight) = survivors
        .iter()
        .map(|&(candidate, score)| {
            let weight = lineage
                .candidate_lineage(&candidate.id)
                .map(|l| source_lineage.agreement(l))
                .unwrap_or(0);
            (candidate, score, weight)
        })
        .reduce(|best, next| {
            if (next.2, next.1) > (best.2, best.1) {
                next
            } else {
                best
            }
        })?;

    let match_type = if weight > 0 {
        MatchType::FuzzyNameWithAncestors
    } else {
        MatchType::FuzzyNameNoAncestors
    };
    Some(MatchRecord::new(source, candidate, match_type, score / 100.0))
}
