//! ============================================================================
//! REST Wire Format
//! ============================================================================
//! JSON shapes returned by the flickr.* methods and their normalization into
//! [`PhotoRecord`] / [`PageResult`]. Nothing outside this module sees the raw
//! per-endpoint structures.
//! ============================================================================

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::types::{FlickrError, ImageFallback, PageResult, PhotoRecord};

/// Numbers arrive as JSON numbers on some endpoints and strings on others
#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(i64),
    Text(String),
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => n,
        Some(NumberOrText::Text(s)) => s.trim().parse().unwrap_or(0),
        None => 0,
    })
}

fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    lenient_i64(deserializer).map(|n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

fn first_page() -> u32 {
    1
}

/// `{"_content": "..."}` wrapper used for free-text fields
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Content {
    #[serde(rename = "_content", default)]
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WirePhoto {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: Option<Content>,
    #[serde(default)]
    datetaken: String,
    #[serde(default)]
    owner: Option<String>,
    #[serde(default)]
    url_m: Option<String>,
    #[serde(default)]
    url_l: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    farm: i64,
    #[serde(default)]
    server: String,
    #[serde(default)]
    secret: String,
}

impl From<WirePhoto> for PhotoRecord {
    fn from(photo: WirePhoto) -> Self {
        PhotoRecord {
            id: photo.id,
            title: photo.title,
            description_text: photo.description.map(|d| d.content).unwrap_or_default(),
            date_taken_raw: photo.datetaken,
            owner_id: non_empty(photo.owner),
            display_image_url: non_empty(photo.url_m),
            large_image_url: non_empty(photo.url_l),
            fallback: ImageFallback {
                farm: photo.farm,
                server: photo.server,
                secret: photo.secret,
            },
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Deserialize)]
pub(crate) struct PhotoList {
    #[serde(default)]
    photo: Vec<WirePhoto>,
    #[serde(default = "first_page", deserialize_with = "lenient_u32")]
    page: u32,
    #[serde(default = "first_page", deserialize_with = "lenient_u32")]
    pages: u32,
}

/// `flickr.people.getPublicPhotos`, `flickr.photos.getContactsPhotos`
#[derive(Debug, Deserialize)]
pub(crate) struct PhotoListResponse {
    photos: PhotoList,
}

impl From<PhotoListResponse> for PageResult {
    fn from(response: PhotoListResponse) -> Self {
        let list = response.photos;
        PageResult {
            records: list.photo.into_iter().map(PhotoRecord::from).collect(),
            current_page: list.page,
            total_pages: list.pages,
        }
    }
}

/// `flickr.people.findByUsername`
#[derive(Debug, Deserialize)]
pub(crate) struct FindByUsernameResponse {
    pub user: NsidUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct NsidUser {
    pub nsid: String,
}

/// `flickr.urls.lookupUser`
#[derive(Debug, Deserialize)]
pub(crate) struct LookupUserResponse {
    pub user: IdUser,
}

#[derive(Debug, Deserialize)]
pub(crate) struct IdUser {
    pub id: String,
}

/// `flickr.people.getInfo`
#[derive(Debug, Deserialize)]
pub(crate) struct PersonResponse {
    pub person: Person,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Person {
    #[serde(default)]
    pub username: Content,
}

/// Decode a REST body: reject `stat != "ok"`, then map into `T`
pub(crate) fn decode<T: DeserializeOwned>(method: &str, body: &str) -> Result<T, FlickrError> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FlickrError::transport(method, format!("malformed JSON response: {}", e)))?;

    let stat = value.get("stat").and_then(Value::as_str).unwrap_or("");
    if stat != "ok" {
        let code = match value.get("code") {
            Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
            Some(Value::String(s)) => s.parse().unwrap_or(0),
            _ => 0,
        };
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("API returned error status '{}'", stat));
        return Err(FlickrError::RemoteApi { code, message });
    }

    serde_json::from_value(value)
        .map_err(|e| FlickrError::transport(method, format!("unexpected response shape: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorKind;

    #[test]
    fn test_decode_public_photos_page() {
        let body = r#"{
            "photos": {
                "page": 2, "pages": "5", "perpage": 2, "total": "10",
                "photo": [
                    {"id": "53001", "owner": "12345@N00", "secret": "abc", "server": "65535", "farm": 66,
                     "title": "Harbour", "description": {"_content": "Early fog"},
                     "datetaken": "2023-07-15 12:34:56", "url_m": "https://live.staticflickr.com/m.jpg",
                     "url_l": "https://live.staticflickr.com/l.jpg"},
                    {"id": "53002", "secret": "def", "server": "65535", "farm": "66", "title": "",
                     "description": {"_content": ""}, "datetaken": ""}
                ]
            },
            "stat": "ok"
        }"#;

        let page: PageResult = decode::<PhotoListResponse>("getPublicPhotos", body)
            .unwrap()
            .into();

        assert_eq!(page.current_page, 2);
        assert_eq!(page.total_pages, 5);
        assert_eq!(page.records.len(), 2);

        let first = &page.records[0];
        assert_eq!(first.id, "53001");
        assert_eq!(first.description_text, "Early fog");
        assert_eq!(first.owner_id.as_deref(), Some("12345@N00"));
        assert_eq!(first.large_image_url.as_deref(), Some("https://live.staticflickr.com/l.jpg"));

        let second = &page.records[1];
        assert_eq!(second.owner_id, None);
        assert_eq!(second.display_image_url, None);
        assert_eq!(second.fallback.farm, 66);
        assert_eq!(second.fallback.secret, "def");
    }

    #[test]
    fn test_decode_contacts_without_paging_fields() {
        let body = r#"{"photos": {"photo": [{"id": "1", "owner": "9@N01", "title": "x"}]}, "stat": "ok"}"#;
        let page: PageResult = decode::<PhotoListResponse>("getContactsPhotos", body)
            .unwrap()
            .into();
        assert_eq!(page.current_page, 1);
        assert_eq!(page.total_pages, 1);
        assert!(page.is_last());
    }

    #[test]
    fn test_decode_fail_stat() {
        let body = r#"{"stat": "fail", "code": 1, "message": "User not found"}"#;
        let err = decode::<FindByUsernameResponse>("findByUsername", body).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RemoteApi);
        match err {
            FlickrError::RemoteApi { code, message } => {
                assert_eq!(code, 1);
                assert_eq!(message, "User not found");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_fail_without_message_gets_default() {
        let err = decode::<LookupUserResponse>("lookupUser", r#"{"stat": "fail"}"#).unwrap_err();
        match err {
            FlickrError::RemoteApi { code, message } => {
                assert_eq!(code, 0);
                assert!(message.contains("fail"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_decode_malformed_is_transport() {
        let err = decode::<PersonResponse>("getInfo", "jsonFlickrApi({})").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);

        let err = decode::<PersonResponse>("getInfo", r#"{"stat": "ok"}"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Transport);
    }

    #[test]
    fn test_decode_lookup_shapes() {
        let found: FindByUsernameResponse = decode(
            "findByUsername",
            r#"{"user": {"id": "12345@N00", "nsid": "12345@N00", "username": {"_content": "jane"}}, "stat": "ok"}"#,
        )
        .unwrap();
        assert_eq!(found.user.nsid, "12345@N00");

        let looked_up: LookupUserResponse = decode(
            "lookupUser",
            r#"{"user": {"id": "67890@N00", "username": {"_content": "joe"}}, "stat": "ok"}"#,
        )
        .unwrap();
        assert_eq!(looked_up.user.id, "67890@N00");

        let person: PersonResponse = decode(
            "getInfo",
            r#"{"person": {"id": "1", "username": {"_content": "Jane Doe"}}, "stat": "ok"}"#,
        )
        .unwrap();
        assert_eq!(person.person.username.content, "Jane Doe");
    }
}
