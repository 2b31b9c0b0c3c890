use std::path::Path;

use chrono::{Local, NaiveDateTime, SubsecRound};
use ezhost_core::{
    redact_reference, ArtifactRecord, DeleteOutcome, EzHostError, PasteRequest, RequestFailure,
};
use ezhost_logging::{ezhost_debug, ezhost_info};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use reqwest::{StatusCode, Url};
use serde_json::{json, Value};

use crate::settings::ApiSettings;
use crate::wire;

/// Header carrying the account API key.
const KEY_HEADER: &str = "key";

/// Remote operations offered by the hosting service.
#[async_trait::async_trait]
pub trait HostApi: Send + Sync {
    async fn upload(&self, path: &Path) -> Result<ArtifactRecord, EzHostError>;

    async fn shorten(&self, url: &str) -> Result<ArtifactRecord, EzHostError>;

    async fn create_paste(&self, paste: &PasteRequest) -> Result<ArtifactRecord, EzHostError>;

    async fn delete(&self, deletion_url: &str) -> Result<DeleteOutcome, EzHostError>;

    async fn exists(&self, deletion_key: &str) -> Result<bool, EzHostError>;

    async fn file_info(&self, file_id: &str) -> Result<Value, EzHostError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestHostApi {
    settings: ApiSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestHostApi {
    pub fn new(settings: ApiSettings) -> Result<Self, EzHostError> {
        let mut base = Url::parse(&settings.base_url)
            .map_err(|err| EzHostError::request(RequestFailure::InvalidUrl, err.to_string()))?;
        // `join` replaces the last segment unless the base ends in a slash.
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(map_reqwest_error)?;

        Ok(Self {
            settings,
            base,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, EzHostError> {
        self.base
            .join(path)
            .map_err(|err| EzHostError::request(RequestFailure::InvalidUrl, err.to_string()))
    }

    fn api_key(&self) -> &str {
        self.settings.api_key.expose()
    }

    async fn send_object(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<serde_json::Map<String, Value>, EzHostError> {
        let response = request.send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        ezhost_debug!("Response status={} body_len={}", status, text.len());
        check_status(status, &text)?;
        wire::parse_object(&text)
    }
}

#[async_trait::async_trait]
impl HostApi for ReqwestHostApi {
    async fn upload(&self, path: &Path) -> Result<ArtifactRecord, EzHostError> {
        let bytes = tokio::fs::read(path).await.map_err(|err| {
            EzHostError::request(RequestFailure::Io, format!("{}: {err}", path.display()))
        })?;
        let file_name = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("upload")
            .to_string();
        ezhost_info!("Uploading {} ({} bytes)", file_name, bytes.len());

        let form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        let request = self
            .client
            .post(self.endpoint("files")?)
            .header(KEY_HEADER, self.api_key())
            .multipart(form);
        let body = self.send_object(request).await?;
        wire::upload_record(body, now())
    }

    async fn shorten(&self, url: &str) -> Result<ArtifactRecord, EzHostError> {
        ezhost_info!("Shortening {}", url);
        let request = self
            .client
            .post(self.endpoint("shortener")?)
            .header(KEY_HEADER, self.api_key())
            .header(CONTENT_TYPE, "application/json")
            .body(json!({ "url": url }).to_string());
        let body = self.send_object(request).await?;
        wire::short_url_record(body, now())
    }

    async fn create_paste(&self, paste: &PasteRequest) -> Result<ArtifactRecord, EzHostError> {
        ezhost_info!("Creating paste title={:?} len={}", paste.title, paste.text.len());
        let payload = json!({
            "text": paste.text,
            "title": paste.title,
            "description": paste.description,
            "language": paste.language,
        });
        let request = self
            .client
            .post(self.endpoint("paste")?)
            .header(KEY_HEADER, self.api_key())
            .header(CONTENT_TYPE, "application/json")
            .body(payload.to_string());
        let body = self.send_object(request).await?;
        wire::paste_record(body, now())
    }

    /// The deletion URL carries its own credential; no API key is sent.
    async fn delete(&self, deletion_url: &str) -> Result<DeleteOutcome, EzHostError> {
        let url = Url::parse(deletion_url.trim()).map_err(|err| {
            EzHostError::request(
                RequestFailure::InvalidUrl,
                format!("{}: {err}", redact_reference(deletion_url)),
            )
        })?;
        ezhost_info!("Deleting via {}", redact_reference(url.as_str()));

        let response = self.client.delete(url).send().await.map_err(map_reqwest_error)?;
        let status = response.status();
        let text = response.text().await.map_err(map_reqwest_error)?;
        check_status(status, &text)?;

        let outcome = match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(body)) => DeleteOutcome {
                success: body.get("success").and_then(Value::as_bool).unwrap_or(false),
                message: wire::message_of(&body),
            },
            _ => DeleteOutcome::refused(format!("unreadable response: {}", wire::excerpt(&text))),
        };
        Ok(outcome)
    }

    async fn exists(&self, deletion_key: &str) -> Result<bool, EzHostError> {
        let mut url = self.endpoint("files/exists")?;
        url.query_pairs_mut().append_pair("key", deletion_key);

        let response = self
            .client
            .get(url)
            .header(KEY_HEADER, self.api_key())
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        let text = response.text().await.map_err(map_reqwest_error)?;
        check_status(status, &text)?;

        let body: Value = serde_json::from_str(&text)
            .map_err(|err| EzHostError::RemoteApi(format!("unreadable response: {err}")))?;
        Ok(body.get("exists").and_then(Value::as_bool).unwrap_or(false))
    }

    async fn file_info(&self, file_id: &str) -> Result<Value, EzHostError> {
        let url = self.endpoint(&format!("files/get/{file_id}"))?;
        let request = self.client.get(url).header(KEY_HEADER, self.api_key());
        self.send_object(request).await.map(Value::Object)
    }
}

fn check_status(status: StatusCode, text: &str) -> Result<(), EzHostError> {
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(EzHostError::request(
            RequestFailure::RateLimited,
            "Rate limit exceeded. Please try again later.",
        ));
    }
    if !status.is_success() {
        let message = match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(body)) => wire::message_of(&body),
            _ => None,
        }
        .unwrap_or_else(|| status.to_string());
        return Err(EzHostError::request(
            RequestFailure::HttpStatus(status.as_u16()),
            message,
        ));
    }
    Ok(())
}

fn now() -> NaiveDateTime {
    Local::now().naive_local().trunc_subsecs(0)
}

/// Drops the request URL from the message; deletion and exists URLs carry keys.
fn map_reqwest_error(err: reqwest::Error) -> EzHostError {
    let err = err.without_url();
    if err.is_timeout() {
        return EzHostError::request(RequestFailure::Timeout, err.to_string());
    }
    if err.is_builder() {
        return EzHostError::request(RequestFailure::InvalidUrl, err.to_string());
    }
    EzHostError::request(RequestFailure::Network, err.to_string())
}
