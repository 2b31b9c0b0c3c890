//! Plain-text rendering of command results.
use ezhost_core::{ArtifactKind, ArtifactRecord, DeleteOutcome, StatusRow};

pub const HEADERS: [&str; 5] = ["Time", "Type", "URL", "Deletion URL", "Status"];

const SEPARATOR: &str = " | ";

pub fn header_line() -> String {
    HEADERS.join(SEPARATOR)
}

pub fn row_line(row: &StatusRow) -> String {
    let record = &row.record;
    [
        record.timestamp_label(),
        record.kind.label().to_string(),
        record.primary_url.clone(),
        record.deletion_url.clone().unwrap_or_else(|| "-".to_string()),
        row.validity.label().to_string(),
    ]
    .join(SEPARATOR)
}

pub fn summary_line(total: usize, valid: usize, invalid: usize) -> String {
    if total == 0 {
        return "History is empty.".to_string();
    }
    format!("{total} items: {valid} valid, {invalid} invalid/expired")
}

pub fn created_message(record: &ArtifactRecord) -> String {
    match record.kind {
        ArtifactKind::File => format!("Upload successful!\nURL: {}", record.primary_url),
        ArtifactKind::ShortenedUrl | ArtifactKind::Paste => record.primary_url.clone(),
    }
}

pub fn delete_message(outcome: &DeleteOutcome) -> String {
    match (outcome.success, outcome.message.as_deref()) {
        (true, _) => "Deleted.".to_string(),
        (false, Some(message)) => format!("Deletion failed: {message}"),
        (false, None) => "Deletion failed!".to_string(),
    }
}
