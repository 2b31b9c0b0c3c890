#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Once;

use chrono::NaiveDateTime;
use ezhost_core::{
    ArtifactKind, ArtifactRecord, ArtifactRemote, DeleteOutcome, EzHostError, HistoryRepository,
    RequestFailure, TIMESTAMP_FORMAT,
};

pub fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(ezhost_logging::initialize_for_tests);
}

pub fn at(stamp: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(stamp, TIMESTAMP_FORMAT).unwrap()
}

pub fn file_record(name: &str, key: &str) -> ArtifactRecord {
    let record = ArtifactRecord::new(
        ArtifactKind::File,
        format!("https://i.e-z.host/{name}"),
        at("2024-01-01 10:00:00"),
    );
    if key.is_empty() {
        record
    } else {
        record.with_deletion_url(format!("https://api.e-z.host/files/delete?key={key}"))
    }
}

#[derive(Debug, Clone)]
pub enum DeleteBehaviour {
    Succeed,
    Refuse,
    Fail,
}

/// Scripted remote: liveness and delete answers per deletion key.
#[derive(Default)]
pub struct FakeRemote {
    live: HashMap<String, Result<bool, EzHostError>>,
    deletes: HashMap<String, DeleteBehaviour>,
    pub exists_calls: RefCell<Vec<String>>,
    pub delete_calls: RefCell<Vec<String>>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(mut self, key: &str, live: bool) -> Self {
        self.live.insert(key.to_string(), Ok(live));
        self
    }

    pub fn check_fails(mut self, key: &str) -> Self {
        self.live.insert(
            key.to_string(),
            Err(EzHostError::request(RequestFailure::Network, "connection reset")),
        );
        self
    }

    pub fn on_delete(mut self, key: &str, behaviour: DeleteBehaviour) -> Self {
        self.deletes.insert(key.to_string(), behaviour);
        self
    }

    pub fn exists_count(&self) -> usize {
        self.exists_calls.borrow().len()
    }
}

impl ArtifactRemote for FakeRemote {
    fn check_exists(&self, deletion_key: &str) -> Result<bool, EzHostError> {
        self.exists_calls.borrow_mut().push(deletion_key.to_string());
        self.live.get(deletion_key).cloned().unwrap_or(Ok(false))
    }

    fn delete_by_reference(&self, deletion_reference: &str) -> Result<DeleteOutcome, EzHostError> {
        self.delete_calls
            .borrow_mut()
            .push(deletion_reference.to_string());
        let key = ezhost_core::deletion_key(deletion_reference).unwrap_or_default();
        match self.deletes.get(&key) {
            Some(DeleteBehaviour::Succeed) => Ok(DeleteOutcome::succeeded()),
            Some(DeleteBehaviour::Refuse) => Ok(DeleteOutcome::refused("not allowed")),
            Some(DeleteBehaviour::Fail) | None => Err(EzHostError::request(
                RequestFailure::HttpStatus(500),
                "server error",
            )),
        }
    }
}

/// In-memory history that counts writes.
#[derive(Default)]
pub struct MemoryHistory {
    pub records: RefCell<Vec<ArtifactRecord>>,
    pub replace_calls: Cell<usize>,
    pub fail_replace: bool,
}

impl MemoryHistory {
    pub fn with(records: Vec<ArtifactRecord>) -> Self {
        Self {
            records: RefCell::new(records),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<ArtifactRecord> {
        self.records.borrow().clone()
    }
}

impl HistoryRepository for MemoryHistory {
    fn load(&self) -> Result<Vec<ArtifactRecord>, EzHostError> {
        Ok(self.records.borrow().clone())
    }

    fn append(&self, mut record: ArtifactRecord) -> Result<ArtifactRecord, EzHostError> {
        record.created_at = at("2024-06-01 08:00:00");
        self.records.borrow_mut().push(record.clone());
        Ok(record)
    }

    fn replace(&self, records: &[ArtifactRecord]) -> Result<(), EzHostError> {
        self.replace_calls.set(self.replace_calls.get() + 1);
        if self.fail_replace {
            return Err(EzHostError::Persistence("disk full".into()));
        }
        *self.records.borrow_mut() = records.to_vec();
        Ok(())
    }
}
