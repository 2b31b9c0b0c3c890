//! ezhost core: artifact records, history reconciliation and validity caching.
//!
//! Nothing in this crate performs IO. Persistence and remote calls come in
//! through the [`HistoryRepository`] and [`ArtifactRemote`] traits.
mod error;
mod ports;
mod reconcile;
mod record;
mod validate;
mod validity;

pub use error::{EzHostError, RequestFailure};
pub use ports::{ArtifactRemote, DeleteOutcome, HistoryRepository};
pub use reconcile::{
    PurgeReport, Reconciler, ScanEvent, ScanPhase, StatusRow, StatusScan, Validity,
    CONFIRMATION_TOKEN, DEFAULT_PROGRESS_EVERY,
};
pub use record::{ArtifactKind, ArtifactRecord, TIMESTAMP_FORMAT};
pub use validate::{
    deletion_key, file_id_from_url, redact_reference, validate_short_url, PasteRequest,
};
pub use validity::ValidityCache;
