use std::path::Path;

use ezhost_core::{
    file_id_from_url, validate_short_url, ArtifactRecord, ArtifactRemote, DeleteOutcome,
    EzHostError, HistoryRepository, PasteRequest, PurgeReport, Reconciler, StatusScan,
};
use ezhost_logging::{ezhost_error, ezhost_info, ezhost_warn};
use serde_json::Value;

use crate::engine::EngineHandle;
use crate::history::JsonHistoryFile;

/// Everything a front-end needs for one process run: the remote engine, the
/// history store and a reconciler whose validity cache lives as long as the
/// session.
///
/// Creation operations validate locally, call the service, and only append
/// to history once the service confirmed the artifact.
pub struct Session<H: HistoryRepository = JsonHistoryFile> {
    engine: EngineHandle,
    history: H,
    reconciler: Reconciler,
}

impl<H: HistoryRepository> Session<H> {
    pub fn new(engine: EngineHandle, history: H) -> Self {
        Self {
            engine,
            history,
            reconciler: Reconciler::new(),
        }
    }

    pub fn with_reconciler(mut self, reconciler: Reconciler) -> Self {
        self.reconciler = reconciler;
        self
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    pub fn upload(&self, path: &Path) -> Result<ArtifactRecord, EzHostError> {
        if !path.is_file() {
            return Err(EzHostError::validation(format!(
                "No file selected! {} is not a readable file",
                path.display()
            )));
        }
        self.ensure_history_readable()?;
        let record = self.engine.upload(path)?;
        self.record(record)
    }

    pub fn shorten(&self, url: &str) -> Result<ArtifactRecord, EzHostError> {
        validate_short_url(url)?;
        self.ensure_history_readable()?;
        let record = self.engine.shorten(url.trim())?;
        self.record(record)
    }

    pub fn paste(&self, paste: &PasteRequest) -> Result<ArtifactRecord, EzHostError> {
        paste.validate()?;
        self.ensure_history_readable()?;
        let record = self.engine.create_paste(paste)?;
        self.record(record)
    }

    /// Deletes one artifact by its deletion URL. History is left as is; a
    /// later listing shows the entry as expired.
    pub fn delete(&self, deletion_url: &str) -> Result<DeleteOutcome, EzHostError> {
        if deletion_url.trim().is_empty() {
            return Err(EzHostError::validation("Please enter a deletion URL!"));
        }
        let outcome = self.engine.delete_by_reference(deletion_url)?;
        if !outcome.success {
            ezhost_warn!(
                "Service refused deletion: {}",
                outcome.message.as_deref().unwrap_or("no message")
            );
        }
        Ok(outcome)
    }

    pub fn file_info(&self, file_url: &str) -> Result<Value, EzHostError> {
        let file_id = file_id_from_url(file_url).ok_or_else(|| {
            EzHostError::validation(
                "Could not find a file id in that URL (expected r2.e-z.host/<bucket>/<id>)",
            )
        })?;
        self.engine.file_info(&file_id)
    }

    pub fn list_with_status(&mut self) -> Result<StatusScan<'_>, EzHostError> {
        self.reconciler.list_with_status(&self.history, &self.engine)
    }

    pub fn purge(&mut self, confirmation: &str) -> Result<PurgeReport, EzHostError> {
        self.reconciler.purge(confirmation, &self.history, &self.engine)
    }

    /// Fails before any remote call when the history cannot be loaded.
    fn ensure_history_readable(&self) -> Result<(), EzHostError> {
        self.history.load().map(|_| ())
    }

    /// A failed append reports both created URLs in the error.
    fn record(&self, record: ArtifactRecord) -> Result<ArtifactRecord, EzHostError> {
        let primary_url = record.primary_url.clone();
        let deletion_url = record.deletion_url.clone();
        match self.history.append(record) {
            Ok(stored) => {
                ezhost_info!("Created {} {}", stored.kind, stored.primary_url);
                Ok(stored)
            }
            Err(err) => {
                ezhost_error!("Created {} but could not record it: {}", primary_url, err);
                Err(EzHostError::Persistence(format!(
                    "created {primary_url} (deletion URL: {}) but could not record it: {err}",
                    deletion_url.as_deref().unwrap_or("none")
                )))
            }
        }
    }
}
