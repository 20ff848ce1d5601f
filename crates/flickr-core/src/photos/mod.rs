//! ============================================================================
//! Photo Source - Flickr REST reads
//! ============================================================================
//! Public reads (api_key only):
//! - flickr.people.getPublicPhotos, paginated up to an exact count
//! - flickr.people.findByUsername / flickr.urls.lookupUser / flickr.people.getInfo
//!
//! OAuth-signed reads (access token required):
//! - flickr.photos.getContactsPhotos, single page, capped at 50
//! ============================================================================

mod wire;

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::signature::{self, SignatureParams};
use crate::config::ApiEndpoints;
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{Credentials, FlickrError, PageResult, PhotoRecord};
use wire::{FindByUsernameResponse, LookupUserResponse, PersonResponse, PhotoListResponse};

/// Largest `per_page` the listing endpoints accept
pub const MAX_PER_PAGE: usize = 500;

/// The contacts endpoint never returns more than this many photos
pub const MAX_CONTACTS_PHOTOS: usize = 50;

/// Extra fields requested on every listing call
const EXTRAS: &str = "description,date_taken,url_m,url_l,owner_name";

/// Client for the photo-listing and user-lookup REST methods
pub struct PhotoSource<'a> {
    credentials: &'a Credentials,
    endpoints: ApiEndpoints,
    transport: Arc<dyn HttpTransport>,
}

impl<'a> PhotoSource<'a> {
    pub fn new(
        credentials: &'a Credentials,
        endpoints: ApiEndpoints,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, FlickrError> {
        credentials.validate()?;

        Ok(Self {
            credentials,
            endpoints,
            transport,
        })
    }

    // ========================================================================
    // Public Photos
    // ========================================================================

    /// Fetch up to `count` of a user's public photos, newest first.
    ///
    /// Pages are requested in order until `count` records are collected, the
    /// service reports the last page, or a page comes back empty. Any failed
    /// page fails the whole call.
    pub async fn fetch_user_photos(
        &self,
        user_id: &str,
        count: usize,
    ) -> Result<Vec<PhotoRecord>, FlickrError> {
        info!("Fetching {} photos for user {}", count, user_id);

        let mut records: Vec<PhotoRecord> = Vec::with_capacity(count.min(MAX_PER_PAGE));
        let mut page: u32 = 1;

        while records.len() < count {
            // Never ask for more than is still needed
            let per_page = (count - records.len()).min(MAX_PER_PAGE);
            let result = self
                .fetch_user_photos_page(user_id, per_page, page)
                .await
                .map_err(|e| e.context(format!("failed to fetch page {} for user {}", page, user_id)))?;

            let received = result.records.len();
            let last = result.is_last();
            debug!(
                "Page {}/{}: {} photos ({} total so far)",
                result.current_page,
                result.total_pages,
                received,
                records.len() + received
            );
            records.extend(result.records);

            if received == 0 || last {
                break;
            }
            page += 1;
        }

        records.truncate(count);
        info!("Fetched {} photos for user {}", records.len(), user_id);
        Ok(records)
    }

    /// Fetch a single page of a user's public photos
    pub async fn fetch_user_photos_page(
        &self,
        user_id: &str,
        per_page: usize,
        page: u32,
    ) -> Result<PageResult, FlickrError> {
        let response: PhotoListResponse = self
            .public_call(
                "flickr.people.getPublicPhotos",
                &[
                    ("user_id", user_id.to_string()),
                    ("per_page", per_page.to_string()),
                    ("page", page.to_string()),
                    ("extras", EXTRAS.to_string()),
                ],
            )
            .await?;

        Ok(response.into())
    }

    // ========================================================================
    // User Lookup
    // ========================================================================

    /// Resolve a username to its NSID
    pub async fn find_user_by_username(&self, username: &str) -> Result<String, FlickrError> {
        debug!("Looking up user by username: {}", username);
        let response: FindByUsernameResponse = self
            .public_call(
                "flickr.people.findByUsername",
                &[("username", username.to_string())],
            )
            .await?;
        Ok(response.user.nsid)
    }

    /// Resolve a photostream/profile URL to its owner's NSID
    pub async fn lookup_user_by_profile_url(&self, profile_url: &str) -> Result<String, FlickrError> {
        debug!("Looking up user by URL: {}", profile_url);
        let response: LookupUserResponse = self
            .public_call("flickr.urls.lookupUser", &[("url", profile_url.to_string())])
            .await?;
        Ok(response.user.id)
    }

    /// The user's screen name
    pub async fn get_display_name(&self, user_id: &str) -> Result<String, FlickrError> {
        let response: PersonResponse = self
            .public_call("flickr.people.getInfo", &[("user_id", user_id.to_string())])
            .await?;
        Ok(response.person.username.content)
    }

    // ========================================================================
    // Contacts Photos (OAuth)
    // ========================================================================

    /// Recent photos from the authenticated user's friends and family.
    ///
    /// `count` is clamped to [`MAX_CONTACTS_PHOTOS`] before the request.
    pub async fn fetch_contacts_photos(&self, count: usize) -> Result<Vec<PhotoRecord>, FlickrError> {
        let (token, token_secret) = self.credentials.access_token_pair().ok_or_else(|| {
            FlickrError::Usage(
                "the contacts feed requires an OAuth access token and secret".to_string(),
            )
        })?;

        if count > MAX_CONTACTS_PHOTOS {
            warn!(
                "Contacts feed is limited to {} photos (requested {})",
                MAX_CONTACTS_PHOTOS, count
            );
        }
        let count = count.min(MAX_CONTACTS_PHOTOS);
        if count == 0 {
            return Ok(Vec::new());
        }

        info!("Fetching {} contacts photos", count);

        let method = "flickr.photos.getContactsPhotos";
        let api_params = [
            ("method", method.to_string()),
            ("format", "json".to_string()),
            ("nojsoncallback", "1".to_string()),
            ("count", count.to_string()),
            ("just_friends", "1".to_string()),
            ("extras", EXTRAS.to_string()),
        ];

        let mut oauth = signature::oauth_params(&self.credentials.consumer_key, Some(token));
        let mut signed: SignatureParams = oauth.clone();
        for (k, v) in &api_params {
            signed.insert(k.to_string(), v.clone());
        }

        let sig = signature::sign(
            "GET",
            &self.endpoints.rest,
            &signed,
            &self.credentials.consumer_secret,
            token_secret,
        )?;
        oauth.insert("oauth_signature".to_string(), sig);

        let mut request = HttpRequest::get(&self.endpoints.rest);
        request.query = api_params
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect();
        request.authorization = Some(signature::authorization_header(&oauth));

        let body = self.send(method, request).await?;
        let page: PageResult = wire::decode::<PhotoListResponse>(method, &body)?.into();

        let mut records = page.records;
        records.truncate(count);
        info!("Fetched {} contacts photos", records.len());
        Ok(records)
    }

    // ========================================================================
    // Request Plumbing
    // ========================================================================

    /// Unsigned REST call authenticated by `api_key` alone
    async fn public_call<T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        params: &[(&str, String)],
    ) -> Result<T, FlickrError> {
        let mut request = HttpRequest::get(&self.endpoints.rest);
        request.query = vec![
            ("method".to_string(), method.to_string()),
            ("api_key".to_string(), self.credentials.consumer_key.clone()),
            ("format".to_string(), "json".to_string()),
            ("nojsoncallback".to_string(), "1".to_string()),
        ];
        request
            .query
            .extend(params.iter().map(|(k, v)| (k.to_string(), v.clone())));

        let body = self.send(method, request).await?;
        wire::decode(method, &body)
    }

    async fn send(&self, method: &str, request: HttpRequest) -> Result<String, FlickrError> {
        let response = self.transport.get(request).await?;
        if response.status != 200 {
            return Err(FlickrError::http_status(method, response.status));
        }
        Ok(response.body)
    }
}
