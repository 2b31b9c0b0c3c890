use crate::{ArtifactRecord, EzHostError};

/// Durable, ordered log of created artifacts.
///
/// Every mutation rewrites the whole collection; implementations must replace
/// the persisted state atomically so a failed write leaves the previous
/// version readable.
pub trait HistoryRepository {
    /// Full collection in insertion order; empty when nothing was persisted yet.
    fn load(&self) -> Result<Vec<ArtifactRecord>, EzHostError>;

    /// Stamps `created_at` with the current time, persists, returns the stored record.
    fn append(&self, record: ArtifactRecord) -> Result<ArtifactRecord, EzHostError>;

    fn replace(&self, records: &[ArtifactRecord]) -> Result<(), EzHostError>;
}

/// Remote calls the reconciliation workflow depends on.
pub trait ArtifactRemote {
    fn check_exists(&self, deletion_key: &str) -> Result<bool, EzHostError>;

    fn delete_by_reference(&self, deletion_reference: &str) -> Result<DeleteOutcome, EzHostError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeleteOutcome {
    pub success: bool,
    pub message: Option<String>,
}

impl DeleteOutcome {
    pub fn succeeded() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn refused(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}
