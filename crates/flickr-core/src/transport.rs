//! ============================================================================
//! HTTP Transport
//! ============================================================================
//! The single seam between the core and the network. Production code uses
//! [`ReqwestTransport`]; tests script responses through their own impl.
//! ============================================================================

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use reqwest::Client;
use tracing::debug;

use crate::config::ClientConfig;
use crate::types::FlickrError;

/// A GET request as the core describes it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpRequest {
    pub url: String,
    /// Query parameters in the order they should be sent
    pub query: Vec<(String, String)>,
    /// Full `Authorization` header value, if the call is signed
    pub authorization: Option<String>,
}

impl HttpRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            query: Vec::new(),
            authorization: None,
        }
    }

    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status and body of a completed request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Issues GET requests on behalf of the core
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request. Only network-level failures are errors; any HTTP
    /// status is returned as a response.
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, FlickrError>;
}

/// reqwest-backed transport with a per-call timeout
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(config: &ClientConfig) -> Result<Self, FlickrError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("flickr-rss/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| FlickrError::transport("building HTTP client", e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: HttpRequest) -> Result<HttpResponse, FlickrError> {
        debug!("GET {} ({} query params)", request.url, request.query.len());

        let mut builder = self.client.get(&request.url).query(&request.query);
        if let Some(auth) = &request.authorization {
            builder = builder.header(AUTHORIZATION, auth);
        }

        let response = builder.send().await.map_err(|e| {
            let detail = if e.is_timeout() {
                format!("request timed out: {}", e)
            } else {
                e.to_string()
            };
            FlickrError::transport(format!("GET {}", request.url), detail)
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| FlickrError::transport(format!("reading body of {}", request.url), e.to_string()))?;

        debug!("GET {} -> {} ({} bytes)", request.url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}
