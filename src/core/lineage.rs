/// Major-rank lineage lookup for both taxonomies
///
/// Built once per run, and only when the exact passes leave taxa
/// unresolved. Names are stored normalized so agreement is a plain string
/// comparison. Every source taxon handed to the build gets an entry, even
/// one with no known ancestor. Candidates without any major-rank ancestor
/// are left out and score zero agreement.
use std::collections::HashMap;

use crate::bio::names::normalize_name;
use crate::bio::taxonomy::{CandidateTaxon, MajorRank, SourceTaxon};

/// Normalized ancestor names at each major rank
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Lineage {
    names: [Option<String>; 5],
}

impl Lineage {
    pub fn from_names<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = (MajorRank, Option<&'a str>)>,
    {
        let mut lineage = Self::default();
        for (rank, name) in names {
            lineage.names[rank.index()] = normalize_name(name);
        }
        lineage
    }

    pub fn from_source(taxon: &SourceTaxon) -> Self {
        Self::from_names(
            MajorRank::ALL
                .into_iter()
                .map(|rank| (rank, taxon.ancestry.name(rank))),
        )
    }

    pub fn from_candidate(candidate: &CandidateTaxon) -> Self {
        Self::from_names(
            MajorRank::ALL
                .into_iter()
                .map(|rank| (rank, candidate.classification.name(rank))),
        )
    }

    pub fn name(&self, rank: MajorRank) -> Option<&str> {
        self.names[rank.index()].as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.names.iter().all(Option::is_none)
    }

    /// Weighted count of major ranks where both lineages name the same
    /// ancestor. Ranks unknown on either side never count.
    pub fn agreement(&self, other: &Lineage) -> u32 {
        MajorRank::ALL
            .into_iter()
            .filter(|&rank| match (self.name(rank), other.name(rank)) {
                (Some(a), Some(b)) => a == b,
                _ => false,
            })
            .map(|rank| rank.agreement_weight())
            .sum()
    }
}

/// Lineage lookups keyed by taxon identifier, one map per taxonomy
#[derive(Debug, Clone, Default)]
pub struct LineageIndex {
    source: HashMap<i64, Lineage>,
    candidate: HashMap<String, Lineage>,
}

impl LineageIndex {
    pub fn build(source_taxa: &[SourceTaxon], candidates: &[CandidateTaxon]) -> Self {
        let source = source_taxa
            .iter()
            .map(|taxon| (taxon.taxon_id, Lineage::from_source(taxon)))
            .collect();

        let candidate = candidates
            .iter()
            .map(|c| (c.id.clone(), Lineage::from_candidate(c)))
            .filter(|(_, lineage)| !lineage.is_empty())
            .collect();

        Self { source, candidate }
    }

    pub fn source_lineage(&self, taxon_id: i64) -> Option<&Lineage> {
        self.source.get(&taxon_id)
    }

    pub fn candidate_lineage(&self, candidate_id: &str) -> Option<&Lineage> {
        self.candidate.get(candidate_id)
    }

    pub fn source_len(&self) -> usize {
        self.source.len()
    }

    pub fn candidate_len(&self) -> usize {
        self.candidate.len()
    }
}
