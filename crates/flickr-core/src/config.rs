//! ============================================================================
//! Client Configuration
//! ============================================================================
//! Endpoint URLs and per-call limits. Passed explicitly into every client so
//! nothing in the core reads process-wide state.
//! ============================================================================

use std::time::Duration;

/// Per-call timeout applied to every HTTP request
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const REST_URL: &str = "https://api.flickr.com/services/rest/";
const REQUEST_TOKEN_URL: &str = "https://www.flickr.com/services/oauth/request_token";
const AUTHORIZE_URL: &str = "https://www.flickr.com/services/oauth/authorize";
const ACCESS_TOKEN_URL: &str = "https://www.flickr.com/services/oauth/access_token";

/// Remote endpoints used by the core
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiEndpoints {
    /// REST method endpoint (`?method=flickr.*`)
    pub rest: String,
    pub request_token: String,
    pub authorize: String,
    pub access_token: String,
}

impl Default for ApiEndpoints {
    fn default() -> Self {
        Self {
            rest: REST_URL.to_string(),
            request_token: REQUEST_TOKEN_URL.to_string(),
            authorize: AUTHORIZE_URL.to_string(),
            access_token: ACCESS_TOKEN_URL.to_string(),
        }
    }
}

/// Configuration shared by the OAuth and REST clients
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoints: ApiEndpoints,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoints: ApiEndpoints::default(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Override the per-call timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}
