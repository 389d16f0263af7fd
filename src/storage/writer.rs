/// Full-refresh persistence of a resolved crosswalk
///
/// Every run clears the sink and rewrites it; there is no upsert. Chunks are
/// committed independently, so a failure leaves the earlier chunks in place
/// and the run has to be repeated from the clear.
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::bio::taxonomy::MatchRecord;
use crate::storage::traits::CrosswalkSink;
use crate::{Result, TaxbridgeError};

pub const DEFAULT_SINK_CHUNK_SIZE: usize = 10_000;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistStats {
    pub records: usize,
    pub chunks: usize,
}

/// Clear `sink`, then append `records` in chunks of `chunk_size`.
pub fn persist_matches<S: CrosswalkSink + ?Sized>(
    sink: &mut S,
    records: &[MatchRecord],
    chunk_size: usize,
) -> Result<PersistStats> {
    if chunk_size == 0 {
        return Err(TaxbridgeError::Configuration(
            "sink chunk size must be greater than zero".to_string(),
        ));
    }

    info!("Clearing existing data from {}...", sink.describe());
    sink.clear()?;

    if records.is_empty() {
        info!("No mappings found to insert.");
        return Ok(PersistStats::default());
    }

    let total_chunks = records.len().div_ceil(chunk_size);
    info!(
        "Bulk inserting {} mappings into {}...",
        records.len(),
        sink.describe()
    );

    let mut committed = 0;
    for (i, chunk) in records.chunks(chunk_size).enumerate() {
        if let Err(e) = sink.append(chunk) {
            error!("Chunk {}/{} failed: {}", i + 1, total_chunks, e);
            return Err(TaxbridgeError::Persistence {
                chunk: i + 1,
                total_chunks,
                committed,
                message: e.to_string(),
            });
        }
        committed += chunk.len();
        info!("Inserted chunk {}/{}", i + 1, total_chunks);
    }

    Ok(PersistStats {
        records: committed,
        chunks: total_chunks,
    })
}
