pub mod memory;
pub mod sqlite;
pub mod traits;
pub mod tsv;
pub mod writer;

pub use memory::MemorySink;
pub use sqlite::SqliteSink;
pub use traits::{CandidateSource, CrosswalkSink, TaxonSource};
pub use tsv::{read_crosswalk_tsv, TsvSink};
pub use writer::{persist_matches, PersistStats, DEFAULT_SINK_CHUNK_SIZE};
