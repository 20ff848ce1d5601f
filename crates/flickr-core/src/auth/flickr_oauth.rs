//! ============================================================================
//! Flickr OAuth 1.0a Three-Legged Flow
//! ============================================================================
//! request token -> user authorizes in a browser -> verifier -> access token.
//! The verifier comes from outside (an interactive prompt); this module only
//! validates and consumes it.
//! ============================================================================

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::signature::{self, percent_encode, SignatureParams};
use crate::config::ApiEndpoints;
use crate::transport::{HttpRequest, HttpTransport};
use crate::types::{Credentials, FlickrError};

/// Permission level requested at the authorize step
const PERMS: &str = "read";

/// Out-of-band callback: the service shows the verifier to the user
const OOB_CALLBACK: &str = "oob";

/// Request token pair, valid between the request-token and access-token calls
#[derive(Clone, PartialEq, Eq)]
pub struct RequestTokenSession {
    pub request_token: String,
    pub request_token_secret: String,
}

impl std::fmt::Debug for RequestTokenSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestTokenSession")
            .field("request_token", &self.request_token)
            .field("request_token_secret", &"<redacted>")
            .finish()
    }
}

/// Where the handshake currently stands
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    RequestTokenObtained(RequestTokenSession),
    AccessTokenObtained,
}

/// Drives the three-legged handshake for one consumer key/secret
pub struct FlickrOAuth {
    consumer_key: String,
    consumer_secret: String,
    endpoints: ApiEndpoints,
    transport: Arc<dyn HttpTransport>,
    state: AuthState,
}

impl FlickrOAuth {
    /// Create an authenticator for the application identified by `credentials`.
    /// Any access token already present is ignored.
    pub fn new(
        credentials: &Credentials,
        endpoints: ApiEndpoints,
        transport: Arc<dyn HttpTransport>,
    ) -> Result<Self, FlickrError> {
        credentials.validate()?;

        Ok(Self {
            consumer_key: credentials.consumer_key.clone(),
            consumer_secret: credentials.consumer_secret.clone(),
            endpoints,
            transport,
            state: AuthState::Unauthenticated,
        })
    }

    pub fn state(&self) -> &AuthState {
        &self.state
    }

    /// Step 1: obtain a request token
    pub async fn obtain_request_token(&mut self) -> Result<RequestTokenSession, FlickrError> {
        info!("Requesting OAuth request token");

        let mut params = signature::oauth_params(&self.consumer_key, None);
        params.insert("oauth_callback".to_string(), OOB_CALLBACK.to_string());

        let (token, token_secret) = self
            .signed_token_call("request_token", &self.endpoints.request_token, params, "")
            .await?;

        debug!("Obtained request token {}", token);
        let session = RequestTokenSession {
            request_token: token,
            request_token_secret: token_secret,
        };
        self.state = AuthState::RequestTokenObtained(session.clone());

        Ok(session)
    }

    /// Step 2: URL the user opens to grant read access. No network call.
    pub fn authorization_url(&self) -> Result<String, FlickrError> {
        let session = self.session().ok_or_else(|| {
            FlickrError::Usage("a request token must be obtained before authorizing".to_string())
        })?;

        Ok(format!(
            "{}?oauth_token={}&perms={}",
            self.endpoints.authorize,
            percent_encode(&session.request_token),
            PERMS
        ))
    }

    /// Step 3: trade the user-supplied verifier for a long-lived access token.
    ///
    /// Returns new credentials; the request token session is discarded
    /// whether the exchange succeeds or the service rejects the verifier.
    pub async fn exchange_verifier(&mut self, verifier: &str) -> Result<Credentials, FlickrError> {
        let verifier = verifier.trim();
        if verifier.is_empty() {
            return Err(FlickrError::Input("verification code is required".to_string()));
        }

        let session = self.session().cloned().ok_or_else(|| {
            FlickrError::Input("no request token is pending; restart authorization".to_string())
        })?;

        info!("Exchanging verifier for access token");

        let mut params =
            signature::oauth_params(&self.consumer_key, Some(&session.request_token));
        params.insert("oauth_verifier".to_string(), verifier.to_string());

        let result = self
            .signed_token_call(
                "access_token",
                &self.endpoints.access_token,
                params,
                &session.request_token_secret,
            )
            .await;

        match result {
            Ok((token, token_secret)) => {
                self.state = AuthState::AccessTokenObtained;
                info!("Authentication successful");
                Ok(Credentials::new(&self.consumer_key, &self.consumer_secret)
                    .with_access_token(token, token_secret))
            }
            Err(e) => {
                warn!("Access token exchange failed, discarding request token");
                self.state = AuthState::Unauthenticated;
                Err(e)
            }
        }
    }

    fn session(&self) -> Option<&RequestTokenSession> {
        match &self.state {
            AuthState::RequestTokenObtained(session) => Some(session),
            _ => None,
        }
    }

    /// Sign a GET to a token endpoint and parse `oauth_token`/`oauth_token_secret`
    async fn signed_token_call(
        &self,
        step: &'static str,
        url: &str,
        mut params: SignatureParams,
        token_secret: &str,
    ) -> Result<(String, String), FlickrError> {
        let signature = signature::sign("GET", url, &params, &self.consumer_secret, token_secret)?;
        params.insert("oauth_signature".to_string(), signature);

        let mut request = HttpRequest::get(url);
        request.authorization = Some(signature::authorization_header(&params));

        let response = self.transport.get(request).await?;

        if response.status != 200 {
            return Err(FlickrError::AuthProtocol {
                step,
                detail: format!("request failed with status {}", response.status),
            });
        }

        parse_token_response(&response.body).ok_or_else(|| FlickrError::AuthProtocol {
            step,
            detail: format!("token missing from response: {}", response.body.trim()),
        })
    }
}

/// Pull the token pair out of an `application/x-www-form-urlencoded` body
fn parse_token_response(body: &str) -> Option<(String, String)> {
    let mut token = None;
    let mut secret = None;

    for (key, value) in url::form_urlencoded::parse(body.trim().as_bytes()) {
        match key.as_ref() {
            "oauth_token" => token = Some(value.into_owned()),
            "oauth_token_secret" => secret = Some(value.into_owned()),
            _ => {}
        }
    }

    match (token, secret) {
        (Some(t), Some(s)) if !t.is_empty() && !s.is_empty() => Some((t, s)),
        _ => None,
    }
}
