use std::fmt;

use chrono::NaiveDateTime;
use serde_json::{Map, Value};

use crate::validate::deletion_key;

/// Persisted timestamp layout, local time with second precision.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArtifactKind {
    File,
    ShortenedUrl,
    Paste,
}

impl ArtifactKind {
    /// Short label used in history listings.
    pub fn label(self) -> &'static str {
        match self {
            ArtifactKind::File => "File",
            ArtifactKind::ShortenedUrl => "URL",
            ArtifactKind::Paste => "Paste",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One remote artifact created through the hosting API.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactRecord {
    pub kind: ArtifactKind,
    /// The URL handed to the user: image, short link or paste.
    pub primary_url: String,
    /// Direct file URL, only ever set for uploads.
    pub raw_url: Option<String>,
    pub deletion_url: Option<String>,
    pub created_at: NaiveDateTime,
    /// Any other fields the service returned; carried through rewrites untouched.
    pub extra: Map<String, Value>,
}

impl ArtifactRecord {
    pub fn new(kind: ArtifactKind, primary_url: impl Into<String>, created_at: NaiveDateTime) -> Self {
        Self {
            kind,
            primary_url: primary_url.into(),
            raw_url: None,
            deletion_url: None,
            created_at,
            extra: Map::new(),
        }
    }

    pub fn with_deletion_url(mut self, deletion_url: impl Into<String>) -> Self {
        self.deletion_url = Some(deletion_url.into());
        self
    }

    pub fn with_raw_url(mut self, raw_url: impl Into<String>) -> Self {
        self.raw_url = Some(raw_url.into());
        self
    }

    /// The deletion reference, treating an empty string as absent.
    pub fn deletion_reference(&self) -> Option<&str> {
        self.deletion_url.as_deref().filter(|url| !url.trim().is_empty())
    }

    /// Key extracted from the deletion reference, used for liveness queries.
    pub fn deletion_key(&self) -> Option<String> {
        self.deletion_reference().and_then(deletion_key)
    }

    pub fn timestamp_label(&self) -> String {
        self.created_at.format(TIMESTAMP_FORMAT).to_string()
    }
}
