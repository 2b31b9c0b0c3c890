use std::fmt;
use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.e-z.host";

/// Opaque API credential. Never printed by `Debug`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            f.write_str("ApiKey(<empty>)")
        } else {
            f.write_str("ApiKey(***)")
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub api_key: ApiKey,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
}

impl ApiSettings {
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            api_key,
            connect_timeout: Duration::from_secs(10),
            // Uploads of large files share this budget.
            request_timeout: Duration::from_secs(120),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
