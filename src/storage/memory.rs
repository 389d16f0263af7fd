/// In-memory crosswalk sink
use crate::bio::taxonomy::MatchRecord;
use crate::storage::traits::CrosswalkSink;
use crate::Result;

#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    records: Vec<MatchRecord>,
    chunks_appended: usize,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[MatchRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<MatchRecord> {
        self.records
    }

    pub fn chunks_appended(&self) -> usize {
        self.chunks_appended
    }
}

impl CrosswalkSink for MemorySink {
    fn clear(&mut self) -> Result<()> {
        self.records.clear();
        self.chunks_appended = 0;
        Ok(())
    }

    fn append(&mut self, chunk: &[MatchRecord]) -> Result<()> {
        self.records.extend_from_slice(chunk);
        self.chunks_appended += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "in-memory crosswalk".to_string()
    }
}
