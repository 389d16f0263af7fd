/// Storage trait hierarchy for taxbridge
///
/// The resolver only ever sees read-only snapshots from the two sources and
/// writes through a single sink once matching is complete.
use crate::bio::taxonomy::{CandidateTaxon, MatchRecord, SourceTaxon};
use crate::Result;

/// Provider of the internal taxonomy snapshot
pub trait TaxonSource {
    /// Load every taxon, active or not; filtering is the resolver's concern
    fn load_taxa(&self) -> Result<Vec<SourceTaxon>>;
}

/// Provider of the ColDP name usage snapshot
pub trait CandidateSource {
    fn load_candidates(&self) -> Result<Vec<CandidateTaxon>>;
}

/// Destination for crosswalk records.
///
/// A run always calls `clear` once and then `append` per chunk. Each
/// `append` is its own unit of work: a failure must leave the sink holding
/// exactly the chunks appended before it.
pub trait CrosswalkSink {
    /// Remove every previously persisted record
    fn clear(&mut self) -> Result<()>;

    /// Persist one chunk atomically
    fn append(&mut self, chunk: &[MatchRecord]) -> Result<()>;

    /// Short description for logs
    fn describe(&self) -> String {
        "crosswalk sink".to_string()
    }
}

impl TaxonSource for Vec<SourceTaxon> {
    fn load_taxa(&self) -> Result<Vec<SourceTaxon>> {
        Ok(self.clone())
    }
}

impl TaxonSource for [SourceTaxon] {
    fn load_taxa(&self) -> Result<Vec<SourceTaxon>> {
        Ok(self.to_vec())
    }
}

impl CandidateSource for Vec<CandidateTaxon> {
    fn load_candidates(&self) -> Result<Vec<CandidateTaxon>> {
        Ok(self.clone())
    }
}

impl CandidateSource for [CandidateTaxon] {
    fn load_candidates(&self) -> Result<Vec<CandidateTaxon>> {
        Ok(self.to_vec())
    }
}

impl<S: CrosswalkSink + ?Sized> CrosswalkSink for Box<S> {
    fn clear(&mut self) -> Result<()> {
        (**self).clear()
    }

    fn append(&mut self, chunk: &[MatchRecord]) -> Result<()> {
        (**self).append(chunk)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
