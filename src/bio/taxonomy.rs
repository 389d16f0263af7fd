/// Taxon records for both taxonomies and the crosswalk records linking them
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bio::names::normalize_name;

/// Major ranks used for homonym disambiguation, lowest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MajorRank {
    Genus,
    Family,
    Order,
    Class,
    Phylum,
}

impl MajorRank {
    pub const ALL: [MajorRank; 5] = [
        MajorRank::Genus,
        MajorRank::Family,
        MajorRank::Order,
        MajorRank::Class,
        MajorRank::Phylum,
    ];

    /// Rank level used by the internal taxonomy's ancestor columns (L20_name etc.)
    pub fn level(&self) -> u32 {
        match self {
            Self::Genus => 20,
            Self::Family => 30,
            Self::Order => 40,
            Self::Class => 50,
            Self::Phylum => 60,
        }
    }

    pub fn from_level(level: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|rank| rank.level() == level)
    }

    /// Parse a rank label; anything that is not a major rank yields `None`
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "genus" => Some(Self::Genus),
            "family" => Some(Self::Family),
            "order" => Some(Self::Order),
            "class" => Some(Self::Class),
            "phylum" => Some(Self::Phylum),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Genus => "genus",
            Self::Family => "family",
            Self::Order => "order",
            Self::Class => "class",
            Self::Phylum => "phylum",
        }
    }

    /// Weight of an ancestor agreement at this rank. Genus outweighs any
    /// single lower-rank disagreement but not two.
    pub fn agreement_weight(&self) -> u32 {
        match self {
            Self::Genus => 2,
            _ => 1,
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            Self::Genus => 0,
            Self::Family => 1,
            Self::Order => 2,
            Self::Class => 3,
            Self::Phylum => 4,
        }
    }
}

impl fmt::Display for MajorRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An ancestor of an internal taxon at one major rank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ancestor {
    pub taxon_id: Option<i64>,
    pub name: Option<String>,
}

/// Ancestors of an internal taxon at each major rank
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ancestry {
    slots: [Option<Ancestor>; 5],
}

impl Ancestry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, rank: MajorRank, taxon_id: Option<i64>, name: Option<&str>) -> Self {
        self.set(rank, taxon_id, name.map(str::to_string));
        self
    }

    pub fn set(&mut self, rank: MajorRank, taxon_id: Option<i64>, name: Option<String>) {
        self.slots[rank.index()] = if taxon_id.is_none() && name.is_none() {
            None
        } else {
            Some(Ancestor { taxon_id, name })
        };
    }

    pub fn get(&self, rank: MajorRank) -> Option<&Ancestor> {
        self.slots[rank.index()].as_ref()
    }

    pub fn name(&self, rank: MajorRank) -> Option<&str> {
        self.get(rank).and_then(|a| a.name.as_deref())
    }

    pub fn taxon_id(&self, rank: MajorRank) -> Option<i64> {
        self.get(rank).and_then(|a| a.taxon_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (MajorRank, &Ancestor)> {
        MajorRank::ALL
            .into_iter()
            .filter_map(move |rank| self.get(rank).map(|a| (rank, a)))
    }
}

/// A taxon from the internal observation-platform taxonomy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceTaxon {
    pub taxon_id: i64,
    pub name: String,
    pub rank: String,
    pub active: bool,
    #[serde(default)]
    pub ancestry: Ancestry,
}

impl SourceTaxon {
    pub fn new(taxon_id: i64, name: &str, rank: &str) -> Self {
        Self {
            taxon_id,
            name: name.to_string(),
            rank: rank.to_string(),
            active: true,
            ancestry: Ancestry::default(),
        }
    }

    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    pub fn with_ancestry(mut self, ancestry: Ancestry) -> Self {
        self.ancestry = ancestry;
        self
    }

    pub fn normalized_name(&self) -> Option<String> {
        normalize_name(Some(&self.name))
    }

    pub fn normalized_rank(&self) -> Option<String> {
        normalize_name(Some(&self.rank))
    }
}

/// ColDP taxonomic status of a name usage
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaxonomicStatus {
    Accepted,
    ProvisionallyAccepted,
    Synonym,
    AmbiguousSynonym,
    Misapplied,
    BareName,
    Other(String),
}

impl TaxonomicStatus {
    pub fn parse(label: &str) -> Self {
        match label.trim().to_lowercase().as_str() {
            "accepted" => Self::Accepted,
            "provisionally accepted" => Self::ProvisionallyAccepted,
            "synonym" => Self::Synonym,
            "ambiguous synonym" => Self::AmbiguousSynonym,
            "misapplied" => Self::Misapplied,
            "bare name" => Self::BareName,
            other => Self::Other(other.to_string()),
        }
    }

    /// The ColDP vocabulary label; also the secondary tie-break key
    pub fn label(&self) -> &str {
        match self {
            Self::Accepted => "accepted",
            Self::ProvisionallyAccepted => "provisionally accepted",
            Self::Synonym => "synonym",
            Self::AmbiguousSynonym => "ambiguous synonym",
            Self::Misapplied => "misapplied",
            Self::BareName => "bare name",
            Self::Other(label) => label,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted)
    }

    pub fn is_synonym(&self) -> bool {
        matches!(self, Self::Synonym | Self::AmbiguousSynonym | Self::Misapplied)
    }
}

impl fmt::Display for TaxonomicStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classification names carried on a ColDP name usage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub genus: Option<String>,
    pub family: Option<String>,
    pub order: Option<String>,
    pub class: Option<String>,
    pub phylum: Option<String>,
}

impl Classification {
    pub fn name(&self, rank: MajorRank) -> Option<&str> {
        match rank {
            MajorRank::Genus => self.genus.as_deref(),
            MajorRank::Family => self.family.as_deref(),
            MajorRank::Order => self.order.as_deref(),
            MajorRank::Class => self.class.as_deref(),
            MajorRank::Phylum => self.phylum.as_deref(),
        }
    }

    pub fn set(&mut self, rank: MajorRank, name: Option<String>) {
        let slot = match rank {
            MajorRank::Genus => &mut self.genus,
            MajorRank::Family => &mut self.family,
            MajorRank::Order => &mut self.order,
            MajorRank::Class => &mut self.class,
            MajorRank::Phylum => &mut self.phylum,
        };
        *slot = name;
    }
}

/// A ColDP name usage, the external side of the crosswalk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateTaxon {
    pub id: String,
    pub name: String,
    pub rank: String,
    pub status: TaxonomicStatus,
    #[serde(default)]
    pub classification: Classification,
}

impl CandidateTaxon {
    pub fn new(id: &str, name: &str, rank: &str, status: TaxonomicStatus) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            rank: rank.to_string(),
            status,
            classification: Classification::default(),
        }
    }

    pub fn with_classification(mut self, classification: Classification) -> Self {
        self.classification = classification;
        self
    }

    pub fn normalized_name(&self) -> Option<String> {
        normalize_name(Some(&self.name))
    }

    pub fn normalized_rank(&self) -> Option<String> {
        normalize_name(Some(&self.rank))
    }
}

/// How a crosswalk record was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    ExactNameRankAccepted,
    ExactNameRankOtherStatus,
    ExactNameOnlyAccepted,
    ExactNameOnlyOtherStatus,
    FuzzyNameSingleMatch,
    FuzzyNameHighestScore,
    FuzzyNameWithAncestors,
    FuzzyNameNoAncestors,
}

impl MatchType {
    pub const ALL: [MatchType; 8] = [
        MatchType::ExactNameRankAccepted,
        MatchType::ExactNameRankOtherStatus,
        MatchType::ExactNameOnlyAccepted,
        MatchType::ExactNameOnlyOtherStatus,
        MatchType::FuzzyNameSingleMatch,
        MatchType::FuzzyNameHighestScore,
        MatchType::FuzzyNameWithAncestors,
        MatchType::FuzzyNameNoAncestors,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ExactNameRankAccepted => "exact_name_rank_accepted",
            Self::ExactNameRankOtherStatus => "exact_name_rank_other_status",
            Self::ExactNameOnlyAccepted => "exact_name_only_accepted",
            Self::ExactNameOnlyOtherStatus => "exact_name_only_other_status",
            Self::FuzzyNameSingleMatch => "fuzzy_name_single_match",
            Self::FuzzyNameHighestScore => "fuzzy_name_highest_score",
            Self::FuzzyNameWithAncestors => "fuzzy_name_with_ancestors",
            Self::FuzzyNameNoAncestors => "fuzzy_name_no_ancestors",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == label)
    }

    pub fn is_exact(&self) -> bool {
        matches!(
            self,
            Self::ExactNameRankAccepted
                | Self::ExactNameRankOtherStatus
                | Self::ExactNameOnlyAccepted
                | Self::ExactNameOnlyOtherStatus
        )
    }

    pub fn is_fuzzy(&self) -> bool {
        !self.is_exact()
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One crosswalk row linking a source taxon to a ColDP name usage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub source_taxon_id: i64,
    pub candidate_id: String,
    pub match_type: MatchType,
    /// In [0, 1]; 1.0 for name+rank exact matches
    pub match_score: f64,
    pub source_name: String,
    pub candidate_name: String,
}

impl MatchRecord {
    pub fn new(
        source: &SourceTaxon,
        candidate: &CandidateTaxon,
        match_type: MatchType,
        match_score: f64,
    ) -> Self {
        Self {
            source_taxon_id: source.taxon_id,
            candidate_id: candidate.id.clone(),
            match_type,
            match_score,
            source_name: source.name.clone(),
            candidate_name: candidate.name.clone(),
        }
    }
}
