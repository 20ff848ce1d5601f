//! ============================================================================
//! Auth Module - OAuth 1.0a signing and the three-legged flow
//! ============================================================================
//! - signature: HMAC-SHA1 request signing shared by every signed call
//! - FlickrOAuth: request token -> authorize URL -> access token
//! ============================================================================

mod flickr_oauth;
pub mod signature;

pub use flickr_oauth::{AuthState, FlickrOAuth, RequestTokenSession};
