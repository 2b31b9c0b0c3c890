use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDateTime, SubsecRound};
use ezhost_core::{ArtifactKind, ArtifactRecord, EzHostError, HistoryRepository, TIMESTAMP_FORMAT};
use ezhost_logging::{ezhost_debug, ezhost_info};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::persist::{AtomicFileWriter, PersistError};

/// Default file name, placed in the user's home directory by the app.
pub const HISTORY_FILENAME: &str = ".ezhost_history.json";

/// Source of `created_at` stamps for appended records.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    raw_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    shortened_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    paste_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    deletion_url: Option<String>,
    #[serde(flatten)]
    extra: Map<String, Value>,
}

impl PersistedEntry {
    fn from_record(record: &ArtifactRecord) -> Self {
        let mut entry = Self {
            timestamp: Some(record.timestamp_label()),
            image_url: None,
            raw_url: record.raw_url.clone(),
            shortened_url: None,
            paste_url: None,
            deletion_url: record.deletion_url.clone(),
            extra: record.extra.clone(),
        };
        let url = Some(record.primary_url.clone());
        match record.kind {
            ArtifactKind::File => entry.image_url = url,
            ArtifactKind::ShortenedUrl => entry.shortened_url = url,
            ArtifactKind::Paste => entry.paste_url = url,
        }
        entry
    }

    fn into_record(self, index: usize) -> Result<ArtifactRecord, EzHostError> {
        let corrupt = |detail: String| EzHostError::CorruptState(format!("entry {index}: {detail}"));

        let timestamp = self
            .timestamp
            .ok_or_else(|| corrupt("missing timestamp".to_string()))?;
        let created_at = NaiveDateTime::parse_from_str(&timestamp, TIMESTAMP_FORMAT)
            .map_err(|err| corrupt(format!("bad timestamp {timestamp:?}: {err}")))?;

        let mut extra = self.extra;
        // Precedence follows the order the kinds were introduced; any
        // secondary URL is kept verbatim.
        let mut candidates = [
            (ArtifactKind::File, "imageUrl", self.image_url),
            (ArtifactKind::ShortenedUrl, "shortenedUrl", self.shortened_url),
            (ArtifactKind::Paste, "pasteUrl", self.paste_url),
        ]
        .into_iter()
        .filter_map(|(kind, key, url)| url.map(|url| (kind, key, url)));

        let (kind, _, primary_url) = candidates
            .next()
            .ok_or_else(|| corrupt("no imageUrl, shortenedUrl or pasteUrl".to_string()))?;
        for (_, key, url) in candidates {
            extra.insert(key.to_string(), Value::String(url));
        }

        Ok(ArtifactRecord {
            kind,
            primary_url,
            raw_url: self.raw_url,
            deletion_url: self.deletion_url,
            created_at,
            extra,
        })
    }
}

/// History kept as one pretty-printed JSON array, rewritten in full on every change.
pub struct JsonHistoryFile {
    path: PathBuf,
    clock: Clock,
}

impl JsonHistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            clock: Arc::new(|| Local::now().naive_local().trunc_subsecs(0)),
        }
    }

    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_all(&self, records: &[ArtifactRecord]) -> Result<(), EzHostError> {
        let entries: Vec<PersistedEntry> = records.iter().map(PersistedEntry::from_record).collect();
        let content = serde_json::to_string_pretty(&entries)
            .map_err(|err| PersistError::Serialize(err.to_string()))?;

        let file_name = self
            .path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                EzHostError::Persistence(format!("{} has no file name", self.path.display()))
            })?;
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        AtomicFileWriter::new(dir).write(file_name, &content)?;
        ezhost_debug!("Wrote {} history entries to {:?}", records.len(), self.path);
        Ok(())
    }
}

impl HistoryRepository for JsonHistoryFile {
    fn load(&self) -> Result<Vec<ArtifactRecord>, EzHostError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => {
                return Err(EzHostError::Persistence(format!(
                    "reading {}: {err}",
                    self.path.display()
                )))
            }
        };

        let entries: Vec<PersistedEntry> = serde_json::from_str(&content).map_err(|err| {
            EzHostError::CorruptState(format!("{}: {err}", self.path.display()))
        })?;
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| entry.into_record(index))
            .collect()
    }

    fn append(&self, mut record: ArtifactRecord) -> Result<ArtifactRecord, EzHostError> {
        let mut records = self.load()?;
        record.created_at = (self.clock)();
        records.push(record.clone());
        self.write_all(&records)?;
        ezhost_info!("Recorded {} {} in history", record.kind, record.primary_url);
        Ok(record)
    }

    fn replace(&self, records: &[ArtifactRecord]) -> Result<(), EzHostError> {
        self.write_all(records)
    }
}
