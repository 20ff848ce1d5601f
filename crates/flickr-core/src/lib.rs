//! ============================================================================
//! FLICKR-CORE: photostream to RSS
//! ============================================================================
//! This crate handles everything between credentials and feed bytes:
//! - OAuth 1.0a HMAC-SHA1 signing and the three-legged token exchange
//! - Flickr REST reads, paginated to an exact photo count
//! - RSS 2.0 feed building and serialization
//!
//! ```text
//! FlickrOAuth ──► Credentials ──► PhotoSource ──► [PhotoRecord] ──► feed::build ──► feed::serialize
//! ```
//! ============================================================================

pub mod auth;
pub mod config;
pub mod feed;
pub mod photos;
pub mod resolve;
pub mod transport;
pub mod types;

#[cfg(test)]
mod testing;

// Re-export main types for convenience
pub use types::*;
pub use auth::{AuthState, FlickrOAuth, RequestTokenSession};
pub use config::{ApiEndpoints, ClientConfig};
pub use feed::{FeedDocument, FeedItem};
pub use photos::PhotoSource;
pub use resolve::{resolve_user, ResolvedUser, UserRef};
pub use transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};
