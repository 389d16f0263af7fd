pub mod coldp;
pub mod expanded_taxa;
pub mod names;
pub mod taxonomy;
pub mod tsv;

pub use names::{normalize_name, normalize_rank};
pub use taxonomy::{
    Ancestry, CandidateTaxon, Classification, MajorRank, MatchRecord, MatchType, SourceTaxon,
    TaxonomicStatus,
};
