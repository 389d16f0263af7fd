/// Exact-name stage: name+rank, then name only
///
/// Both passes prefer an `accepted` candidate. Among several non-accepted
/// (or several accepted) candidates the first by status label, then by
/// candidate ID, wins, so the outcome never depends on input order.
use std::collections::HashMap;
use tracing::info;

use crate::bio::names::normalize_name;
use crate::bio::taxonomy::{CandidateTaxon, MatchRecord, MatchType, SourceTaxon};

pub const NAME_RANK_SCORE: f64 = 1.0;
pub const NAME_ONLY_SCORE: f64 = 0.95;

#[derive(Debug, Clone, Default)]
pub struct ExactOutcome {
    pub matches: Vec<MatchRecord>,
    pub unmatched: Vec<SourceTaxon>,
    pub name_rank_matches: usize,
    pub name_only_matches: usize,
}

/// Candidate lookups by normalized (name, rank) and by normalized name
pub struct ExactMatcher<'a> {
    by_name_rank: HashMap<(String, String), Vec<&'a CandidateTaxon>>,
    by_name: HashMap<String, Vec<&'a CandidateTaxon>>,
}

fn preference_key(candidate: &CandidateTaxon) -> (bool, &str, &str) {
    (
        !candidate.status.is_accepted(),
        candidate.status.label(),
        candidate.id.as_str(),
    )
}

impl<'a> ExactMatcher<'a> {
    pub fn new(candidates: &'a [CandidateTaxon]) -> Self {
        let mut by_name_rank: HashMap<(String, String), Vec<&'a CandidateTaxon>> = HashMap::new();
        let mut by_name: HashMap<String, Vec<&'a CandidateTaxon>> = HashMap::new();

        for candidate in candidates {
            let Some(name) = candidate.normalized_name() else {
                continue;
            };
            if let Some(rank) = candidate.normalized_rank() {
                by_name_rank
                    .entry((name.clone(), rank))
                    .or_default()
                    .push(candidate);
            }
            by_name.entry(name).or_default().push(candidate);
        }

        for group in by_name_rank.values_mut().chain(by_name.values_mut()) {
            group.sort_by(|a, b| preference_key(a).cmp(&preference_key(b)));
        }

        Self {
            by_name_rank,
            by_name,
        }
    }

    /// Preferred candidate sharing the taxon's normalized name and rank
    pub fn match_name_rank(&self, taxon: &SourceTaxon) -> Option<&'a CandidateTaxon> {
        let name = taxon.normalized_name()?;
        let rank = taxon.normalized_rank()?;
        self.by_name_rank
            .get(&(name, rank))
            .and_then(|group| group.first().copied())
    }

    /// Preferred candidate sharing the taxon's normalized name, any rank
    pub fn match_name_only(&self, taxon: &SourceTaxon) -> Option<&'a CandidateTaxon> {
        let name = normalize_name(Some(&taxon.name))?;
        self.by_name.get(&name).and_then(|group| group.first().copied())
    }

    /// Run pass A over `taxa`, then pass B over what pass A left.
    pub fn resolve(&self, taxa: Vec<SourceTaxon>) -> ExactOutcome {
        let mut outcome = ExactOutcome::default();

        info!("Attempting exact match on scientific name and rank...");
        let mut after_name_rank = Vec::new();
        for taxon in taxa {
            match self.match_name_rank(&taxon) {
                Some(candidate) => {
                    let match_type = if candidate.status.is_accepted() {
                        MatchType::ExactNameRankAccepted
                    } else {
                        MatchType::ExactNameRankOtherStatus
                    };
                    outcome
                        .matches
                        .push(MatchRecord::new(&taxon, candidate, match_type, NAME_RANK_SCORE));
                    outcome.name_rank_matches += 1;
                }
                None => after_name_rank.push(taxon),
            }
        }
        info!("Found {} matches on name and rank.", outcome.name_rank_matches);

        if !after_name_rank.is_empty() {
            info!(
                "Attempting exact match on scientific name only for {} remaining taxa...",
                after_name_rank.len()
            );
        }
        for taxon in after_name_rank {
            match self.match_name_only(&taxon) {
                Some(candidate) => {
                    let match_type = if candidate.status.is_accepted() {
                        MatchType::ExactNameOnlyAccepted
                    } else {
                        MatchType::ExactNameOnlyOtherStatus
                    };
                    outcome
                        .matches
                        .push(MatchRecord::new(&taxon, candidate, match_type, NAME_ONLY_SCORE));
                    outcome.name_only_matches += 1;
                }
                None => outcome.unmatched.push(taxon),
            }
        }
        info!("Found {} matches on name only.", outcome.name_only_matches);

        outcome
    }
}
