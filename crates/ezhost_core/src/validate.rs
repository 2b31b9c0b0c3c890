//! Local input checks and URL helpers applied before any remote call.
use url::Url;

use crate::EzHostError;

const FILE_HOST: &str = "r2.e-z.host";

/// Rejects anything that is not an absolute `http://` or `https://` URL.
pub fn validate_short_url(url: &str) -> Result<(), EzHostError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(EzHostError::validation("Please enter a URL!"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://")) {
        return Err(EzHostError::validation(
            "Invalid URL! Please include http:// or https://",
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasteRequest {
    pub text: String,
    pub title: String,
    pub description: String,
    pub language: String,
}

impl PasteRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), EzHostError> {
        if self.text.is_empty() {
            return Err(EzHostError::validation("Please enter content!"));
        }
        Ok(())
    }
}

/// Value of the `key` query parameter of a deletion URL, if present and non-empty.
pub fn deletion_key(deletion_reference: &str) -> Option<String> {
    let parsed = Url::parse(deletion_reference.trim()).ok()?;
    parsed
        .query_pairs()
        .find(|(name, _)| name == "key")
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Deletion reference with its query masked, for log output.
pub fn redact_reference(deletion_reference: &str) -> String {
    match deletion_reference.trim().split_once('?') {
        Some((base, _)) => format!("{base}?***"),
        None => deletion_reference.trim().to_string(),
    }
}

/// File id from a `r2.e-z.host/<bucket>/<id>` URL. The scheme may be omitted.
pub fn file_id_from_url(url: &str) -> Option<String> {
    let url = url.trim();
    let parsed = Url::parse(url)
        .ok()
        .filter(|parsed| parsed.has_host())
        .or_else(|| Url::parse(&format!("https://{url}")).ok())?;
    if parsed.host_str() != Some(FILE_HOST) {
        return None;
    }
    let mut segments = parsed.path_segments()?;
    // bucket
    segments.next().filter(|s| !s.is_empty())?;
    segments
        .next()
        .filter(|id| !id.is_empty())
        .map(ToOwned::to_owned)
}
