//! Translation of service responses into artifact records.
use chrono::NaiveDateTime;
use ezhost_core::{ArtifactKind, ArtifactRecord, EzHostError};
use serde_json::{Map, Value};

/// Response keys that describe the call rather than the artifact.
const TRANSIENT_KEYS: &[&str] = &["success", "message", "timestamp"];

const SHORT_URL_KEYS: [&str; 2] = ["shortendUrl", "shortenedUrl"];

pub(crate) fn upload_record(
    mut body: Map<String, Value>,
    created_at: NaiveDateTime,
) -> Result<ArtifactRecord, EzHostError> {
    let image_url = require(&mut body, &["imageUrl"])?;
    let mut record = ArtifactRecord::new(ArtifactKind::File, image_url, created_at);
    record.raw_url = take_string(&mut body, "rawUrl");
    record.deletion_url = take_string(&mut body, "deletionUrl");
    record.extra = strip_transient(body);
    Ok(record)
}

/// The shortener answers with `shortendUrl`; `shortenedUrl` is accepted too.
pub(crate) fn short_url_record(
    mut body: Map<String, Value>,
    created_at: NaiveDateTime,
) -> Result<ArtifactRecord, EzHostError> {
    let short_url = require(&mut body, &SHORT_URL_KEYS)?;
    for key in SHORT_URL_KEYS {
        body.remove(key);
    }
    let mut record = ArtifactRecord::new(ArtifactKind::ShortenedUrl, short_url, created_at);
    record.deletion_url = take_string(&mut body, "deletionUrl");
    record.extra = strip_transient(body);
    Ok(record)
}

pub(crate) fn paste_record(
    mut body: Map<String, Value>,
    created_at: NaiveDateTime,
) -> Result<ArtifactRecord, EzHostError> {
    let paste_url = require(&mut body, &["pasteUrl"])?;
    let mut record = ArtifactRecord::new(ArtifactKind::Paste, paste_url, created_at);
    record.deletion_url = take_string(&mut body, "deletionUrl");
    record.extra = strip_transient(body);
    Ok(record)
}

/// Parses a body as a JSON object and turns `success: false` into an api error.
pub(crate) fn parse_object(text: &str) -> Result<Map<String, Value>, EzHostError> {
    let value: Value = serde_json::from_str(text)
        .map_err(|err| EzHostError::RemoteApi(format!("unreadable response: {err}")))?;
    let Value::Object(body) = value else {
        return Err(EzHostError::RemoteApi(format!(
            "expected a JSON object, got: {}",
            excerpt(text)
        )));
    };
    if body.get("success") == Some(&Value::Bool(false)) {
        return Err(EzHostError::RemoteApi(
            message_of(&body).unwrap_or_else(|| "Unknown error".to_string()),
        ));
    }
    Ok(body)
}

pub(crate) fn message_of(body: &Map<String, Value>) -> Option<String> {
    ["message", "error"]
        .iter()
        .find_map(|key| body.get(*key).and_then(Value::as_str))
        .map(ToOwned::to_owned)
}

/// First 200 characters of a body, for error messages.
pub(crate) fn excerpt(text: &str) -> String {
    text.chars().take(200).collect()
}

pub(crate) fn take_string(body: &mut Map<String, Value>, key: &str) -> Option<String> {
    match body.remove(key) {
        Some(Value::String(value)) if !value.is_empty() => Some(value),
        _ => None,
    }
}

fn require(body: &mut Map<String, Value>, keys: &[&str]) -> Result<String, EzHostError> {
    keys.iter()
        .find_map(|key| take_string(body, key))
        .ok_or_else(|| EzHostError::RemoteApi(format!("response did not include {}", keys[0])))
}

fn strip_transient(mut body: Map<String, Value>) -> Map<String, Value> {
    for key in TRANSIENT_KEYS {
        body.remove(*key);
    }
    body
}
