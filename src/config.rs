use std::fmt;

pub const DEFAULT_API_URL: &str = "http://localhost:8081";
pub const DEFAULT_SERVER_ID: &str = "localhost";

/// Connection settings for one PowerDNS Authoritative API endpoint.
///
/// Built once by the caller and handed to [`crate::powerdns::client::PowerDnsClient`];
/// nothing in the engine reads ambient configuration.
#[derive(Clone)]
pub struct ApiConfig {
    pub api_url: String, // "http://localhost:8081"
    pub api_key: String,
    pub server_id: String, // usually "localhost"
}

impl ApiConfig {
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            server_id: server_id.into(),
        }
    }

    /// Versioned API root without trailing slash (e.g. `http://localhost:8081/api/v1`).
    pub fn api_base(&self) -> String {
        let root = self.api_url.trim_end_matches('/');
        if root.ends_with("/api/v1") {
            root.to_string()
        } else {
            format!("{root}/api/v1")
        }
    }
}

// The key is a credential; keep it out of logs and panics.
impl fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &"<REDACTED>")
            .field("server_id", &self.server_id)
            .finish()
    }
}
