use std::path::Path;
use std::sync::Arc;

use ezhost_core::{
    ArtifactRecord, ArtifactRemote, DeleteOutcome, EzHostError, PasteRequest, RequestFailure,
};
use serde_json::Value;
use tokio::runtime::Runtime;

use crate::client::{HostApi, ReqwestHostApi};
use crate::settings::ApiSettings;

/// Blocking front for a [`HostApi`].
///
/// Owns the tokio runtime that drives the async client so callers, including
/// the reconciliation iterator, can issue one remote call at a time without
/// being async themselves. Must not be used from inside another runtime.
pub struct EngineHandle {
    runtime: Runtime,
    api: Arc<dyn HostApi>,
}

impl EngineHandle {
    pub fn new(settings: ApiSettings) -> Result<Self, EzHostError> {
        let api = ReqwestHostApi::new(settings)?;
        Self::with_api(Arc::new(api))
    }

    pub fn with_api(api: Arc<dyn HostApi>) -> Result<Self, EzHostError> {
        let runtime = Runtime::new().map_err(|err| {
            EzHostError::request(RequestFailure::Io, format!("tokio runtime: {err}"))
        })?;
        Ok(Self { runtime, api })
    }

    pub fn upload(&self, path: &Path) -> Result<ArtifactRecord, EzHostError> {
        self.runtime.block_on(self.api.upload(path))
    }

    pub fn shorten(&self, url: &str) -> Result<ArtifactRecord, EzHostError> {
        self.runtime.block_on(self.api.shorten(url))
    }

    pub fn create_paste(&self, paste: &PasteRequest) -> Result<ArtifactRecord, EzHostError> {
        self.runtime.block_on(self.api.create_paste(paste))
    }

    pub fn file_info(&self, file_id: &str) -> Result<Value, EzHostError> {
        self.runtime.block_on(self.api.file_info(file_id))
    }
}

impl ArtifactRemote for EngineHandle {
    fn check_exists(&self, deletion_key: &str) -> Result<bool, EzHostError> {
        self.runtime.block_on(self.api.exists(deletion_key))
    }

    fn delete_by_reference(&self, deletion_reference: &str) -> Result<DeleteOutcome, EzHostError> {
        self.runtime.block_on(self.api.delete(deletion_reference))
    }
}
