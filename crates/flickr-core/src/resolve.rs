//! ============================================================================
//! User Resolution
//! ============================================================================
//! Turns whatever the user typed (profile URL, username, or NSID) into a user
//! id plus a name to show in the feed title.
//! ============================================================================

use tracing::{debug, warn};

use crate::photos::PhotoSource;
use crate::types::FlickrError;

/// How an input token will be resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserRef {
    /// `http(s)://[www.]flickr.com/photos/<name>...`
    ProfileUrl(String),
    /// Anything containing a non-digit
    Username(String),
    /// All digits: used as the user id directly
    UserId(String),
}

impl UserRef {
    pub fn classify(input: &str) -> Self {
        let input = input.trim();
        if is_profile_url(input) {
            UserRef::ProfileUrl(input.to_string())
        } else if input.chars().any(|c| !c.is_ascii_digit()) {
            UserRef::Username(input.to_string())
        } else {
            UserRef::UserId(input.to_string())
        }
    }
}

/// A resolved feed subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedUser {
    pub user_id: String,
    pub display_name: String,
}

/// Profile URLs: http or https, flickr.com with optional www, path under /photos/<name>
pub fn is_profile_url(input: &str) -> bool {
    let Ok(parsed) = url::Url::parse(input) else {
        return false;
    };

    if !matches!(parsed.scheme(), "http" | "https") {
        return false;
    }
    if !matches!(parsed.host_str(), Some("flickr.com") | Some("www.flickr.com")) {
        return false;
    }

    let mut segments = match parsed.path_segments() {
        Some(segments) => segments,
        None => return false,
    };
    matches!(
        (segments.next(), segments.next()),
        (Some("photos"), Some(name)) if !name.is_empty()
    )
}

/// Resolve `input` to a user id and display name.
///
/// Numeric ids need no network call. For profile URLs, a failed display-name
/// lookup falls back to the raw id; every other failure is returned.
pub async fn resolve_user(source: &PhotoSource<'_>, input: &str) -> Result<ResolvedUser, FlickrError> {
    if input.trim().is_empty() {
        return Err(FlickrError::Usage(
            "a username, user ID, or profile URL is required".to_string(),
        ));
    }

    let resolved = match UserRef::classify(input) {
        UserRef::ProfileUrl(url) => {
            debug!("Detected Flickr profile URL, looking up user");
            let user_id = source
                .lookup_user_by_profile_url(&url)
                .await
                .map_err(|e| e.context(format!("failed to look up user from URL '{}'", url)))?;

            let display_name = match source.get_display_name(&user_id).await {
                Ok(name) if !name.is_empty() => name,
                Ok(_) => user_id.clone(),
                Err(e) => {
                    warn!("Failed to get username, using user ID: {}", e);
                    user_id.clone()
                }
            };
            ResolvedUser {
                user_id,
                display_name,
            }
        }
        UserRef::Username(username) => {
            let user_id = source
                .find_user_by_username(&username)
                .await
                .map_err(|e| e.context(format!("failed to find user by username '{}'", username)))?;
            ResolvedUser {
                user_id,
                display_name: username,
            }
        }
        UserRef::UserId(id) => ResolvedUser {
            user_id: id.clone(),
            display_name: id,
        },
    };

    debug!(
        "Resolved user id {} (display name {})",
        resolved.user_id, resolved.display_name
    );
    Ok(resolved)
}
