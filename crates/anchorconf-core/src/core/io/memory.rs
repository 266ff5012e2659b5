use super::records::OutcomeRecord;
use super::traits::{RecordError, RecordSink};
use std::sync::{Arc, Mutex};

/// A sink that keeps records in memory.
///
/// Clones share the same buffer, so a caller can hand one clone to the pipeline and read
/// the delivered records through another.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    records: Arc<Mutex<Vec<OutcomeRecord>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A snapshot of the records written so far, in delivery order.
    pub fn records(&self) -> Vec<OutcomeRecord> {
        self.records
            .lock()
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl RecordSink for MemorySink {
    fn write(&mut self, record: &OutcomeRecord) -> Result<(), RecordError> {
        let mut records = self
            .records
            .lock()
            .map_err(|_| RecordError::Io(std::io::Error::other("memory sink lock poisoned")))?;
        records.push(record.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(index: usize) -> OutcomeRecord {
        OutcomeRecord {
            input_index: index,
            channel_count: index + 1,
            molecule: format!("m{}", index),
            status: "success".to_string(),
            reason: None,
            scaffold: Some(0),
            similarity: None,
            structures: Vec::new(),
        }
    }

    #[test]
    fn clones_share_the_same_buffer() {
        let observer = MemorySink::new();
        let mut writer = observer.clone();
        writer.write(&record(0)).unwrap();
        writer.write(&record(1)).unwrap();
        assert_eq!(observer.len(), 2);
        let indices: Vec<_> = observer.records().iter().map(|r| r.input_index).collect();
        assert_eq!(indices, vec![0, 1]);
    }

    #[test]
    fn new_sink_is_empty() {
        assert!(MemorySink::new().is_empty());
    }
}
