use super::records::OutcomeRecord;
use crate::core::models::molecule::MoleculeGraph;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Failed to parse molecule records: {0}")]
    Deserialize(#[from] toml::de::Error),
    #[error("Failed to serialize record: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("Invalid record for molecule '{molecule}': {reason}")]
    Invalid { molecule: String, reason: String },
}

/// An ordered, finite and restartable supply of molecules.
///
/// Both target molecules and scaffold candidates are read through this trait. Calling
/// [`molecules`](MoleculeSource::molecules) twice must yield the same sequence.
pub trait MoleculeSource {
    /// Reads every molecule of the source, in order.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying data cannot be read or describes an invalid graph.
    fn molecules(&self) -> Result<Vec<MoleculeGraph>, RecordError>;
}

impl MoleculeSource for Vec<MoleculeGraph> {
    fn molecules(&self) -> Result<Vec<MoleculeGraph>, RecordError> {
        Ok(self.clone())
    }
}

/// An append-only destination for outcome records.
///
/// Implementations are driven by one writer at a time; the orchestrator serializes access.
pub trait RecordSink: Send {
    /// Appends one record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be serialized or written.
    fn write(&mut self, record: &OutcomeRecord) -> Result<(), RecordError>;

    /// Flushes buffered output. The default does nothing.
    fn flush(&mut self) -> Result<(), RecordError> {
        Ok(())
    }
}

/// A sink that drops every record, for channels nobody asked to keep.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiscardSink;

impl RecordSink for DiscardSink {
    fn write(&mut self, _record: &OutcomeRecord) -> Result<(), RecordError> {
        Ok(())
    }
}
