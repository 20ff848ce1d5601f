//! ============================================================================
//! Core Types - Shared data structures for flickr-core
//! ============================================================================
//! Credentials, normalized photo records, and the error taxonomy every
//! component reports through.
//! ============================================================================

use serde::{Deserialize, Serialize};

// ============================================================================
// Credentials
// ============================================================================

/// Consumer key/secret plus the optional long-lived access token pair
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub consumer_key: String,
    pub consumer_secret: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token_secret: Option<String>,
}

impl Credentials {
    /// Credentials carrying only the application identity
    pub fn new(consumer_key: impl Into<String>, consumer_secret: impl Into<String>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
            access_token: None,
            access_token_secret: None,
        }
    }

    /// Attach an access token pair
    pub fn with_access_token(
        mut self,
        token: impl Into<String>,
        token_secret: impl Into<String>,
    ) -> Self {
        self.access_token = Some(token.into());
        self.access_token_secret = Some(token_secret.into());
        self
    }

    /// Ensure the consumer key and secret are present
    pub fn validate(&self) -> Result<(), FlickrError> {
        if self.consumer_key.trim().is_empty() {
            return Err(FlickrError::Input("API key is required".to_string()));
        }
        if self.consumer_secret.trim().is_empty() {
            return Err(FlickrError::Input("API secret is required".to_string()));
        }
        Ok(())
    }

    /// True when both halves of the access token pair are present
    pub fn has_oauth(&self) -> bool {
        self.access_token_pair().is_some()
    }

    /// The access token and its secret, only when both are non-empty
    pub fn access_token_pair(&self) -> Option<(&str, &str)> {
        match (self.access_token.as_deref(), self.access_token_secret.as_deref()) {
            (Some(token), Some(secret)) if !token.is_empty() && !secret.is_empty() => {
                Some((token, secret))
            }
            _ => None,
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("consumer_key", &self.consumer_key)
            .field("consumer_secret", &"<redacted>")
            .field("access_token", &self.access_token)
            .field(
                "access_token_secret",
                &self.access_token_secret.as_ref().map(|_| "<redacted>"),
            )
            .finish()
    }
}

// ============================================================================
// Photo Records
// ============================================================================

/// farm/server/secret triple used to build a static image URL when the
/// listing call did not return one
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageFallback {
    pub farm: i64,
    pub server: String,
    pub secret: String,
}

/// A photo normalized from any listing endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: String,
    pub title: String,
    /// Free text, empty when the photo has no description
    pub description_text: String,
    /// `YYYY-MM-DD HH:MM:SS` as returned by the service, possibly empty
    pub date_taken_raw: String,
    /// Owner NSID; listing endpoints scoped to one user may omit it
    pub owner_id: Option<String>,
    /// Medium-size image (`url_m`)
    pub display_image_url: Option<String>,
    /// Large image (`url_l`)
    pub large_image_url: Option<String>,
    pub fallback: ImageFallback,
}

/// One page of a paginated listing
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageResult {
    pub records: Vec<PhotoRecord>,
    pub current_page: u32,
    pub total_pages: u32,
}

impl PageResult {
    /// True when the service reports no page after this one
    pub fn is_last(&self) -> bool {
        self.current_page >= self.total_pages
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Discriminator for [`FlickrError`], stable across context wrapping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    RemoteApi,
    AuthProtocol,
    Input,
    Usage,
}

/// Error types for flickr-core
#[derive(Debug, thiserror::Error)]
pub enum FlickrError {
    /// Network failure, timeout, non-200 status, or an undecodable body
    #[error("{}", transport_message(.operation, .status, .detail))]
    Transport {
        operation: String,
        status: Option<u16>,
        detail: String,
    },

    /// The service answered with `stat != "ok"`
    #[error("Flickr API error: {message} (code {code})")]
    RemoteApi { code: i64, message: String },

    /// OAuth endpoint failed or returned an incomplete token response
    #[error("OAuth {step} failed: {detail}")]
    AuthProtocol { step: &'static str, detail: String },

    #[error("Invalid input: {0}")]
    Input(String),

    #[error("Usage error: {0}")]
    Usage(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<FlickrError>,
    },
}

fn transport_message(operation: &str, status: &Option<u16>, detail: &str) -> String {
    match status {
        Some(code) => format!("{} failed with HTTP status {}: {}", operation, code, detail),
        None => format!("{} failed: {}", operation, detail),
    }
}

impl FlickrError {
    /// Kind of the innermost error
    pub fn kind(&self) -> ErrorKind {
        match self {
            FlickrError::Transport { .. } => ErrorKind::Transport,
            FlickrError::RemoteApi { .. } => ErrorKind::RemoteApi,
            FlickrError::AuthProtocol { .. } => ErrorKind::AuthProtocol,
            FlickrError::Input(_) => ErrorKind::Input,
            FlickrError::Usage(_) => ErrorKind::Usage,
            FlickrError::Context { source, .. } => source.kind(),
        }
    }

    /// Wrap with a description of what was being attempted
    pub fn context(self, context: impl Into<String>) -> Self {
        FlickrError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    pub(crate) fn transport(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        FlickrError::Transport {
            operation: operation.into(),
            status: None,
            detail: detail.into(),
        }
    }

    pub(crate) fn http_status(operation: impl Into<String>, status: u16) -> Self {
        FlickrError::Transport {
            operation: operation.into(),
            status: Some(status),
            detail: "unexpected response status".to_string(),
        }
    }
}
