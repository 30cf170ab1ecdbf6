//! Request DTOs.
//!
//! Each payload struct names exactly the fields a client may write; any other
//! key in the request body is ignored.

use serde::Deserialize;

use albumhub_core::de::{LenientInt, LenientString};

#[derive(Debug, Default, Deserialize)]
pub struct AlbumPayload {
    pub title: Option<String>,
    pub genre: Option<String>,
    #[serde(alias = "artist_id")]
    pub artist: Option<LenientInt>,
    #[serde(alias = "release_year")]
    pub releaseyear: Option<LenientString>,
}

impl AlbumPayload {
    pub fn artist(&self) -> Option<i64> {
        self.artist.map(|a| a.0)
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ArtistPayload {
    pub name: Option<String>,
    pub age: Option<LenientInt>,
    pub pob: Option<String>,
}

impl ArtistPayload {
    pub fn age(&self) -> Option<i64> {
        self.age.map(|a| a.0)
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `?page=N`. Anything that is not a non-negative integer reads as page 1.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    pub fn page(&self) -> Option<u64> {
        self.page.as_deref().and_then(|p| p.trim().parse().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn album_payload_drops_unknown_fields() {
        let body: AlbumPayload = serde_json::from_value(serde_json::json!({
            "title": "genesis",
            "id": 99,
            "created_at": "yesterday",
            "artist": "1",
        }))
        .unwrap();

        assert_eq!(body.title.as_deref(), Some("genesis"));
        assert_eq!(body.artist(), Some(1));
        assert!(body.genre.is_none());
    }

    #[test]
    fn album_payload_accepts_column_aliases() {
        let body: AlbumPayload =
            serde_json::from_value(serde_json::json!({"artist_id": 3, "release_year": "1999"})).unwrap();

        assert_eq!(body.artist(), Some(3));
        assert_eq!(body.releaseyear, Some(LenientString("1999".into())));
    }

    #[test]
    fn numeric_releaseyear_becomes_text() {
        let body: AlbumPayload =
            serde_json::from_value(serde_json::json!({"releaseyear": 2000})).unwrap();
        assert_eq!(body.releaseyear, Some(LenientString("2000".into())));
    }

    #[test]
    fn unparseable_page_falls_back() {
        let query = |p: &str| PageQuery { page: Some(p.to_string()) }.page();
        assert_eq!(query("3"), Some(3));
        assert_eq!(query("abc"), None);
        assert_eq!(query("-2"), None);
        assert_eq!(PageQuery::default().page(), None);
    }

    #[test]
    fn artist_age_accepts_string_or_number() {
        let a: ArtistPayload = serde_json::from_value(serde_json::json!({"age": "40"})).unwrap();
        let b: ArtistPayload = serde_json::from_value(serde_json::json!({"age": 40})).unwrap();
        assert_eq!(a.age(), Some(40));
        assert_eq!(b.age(), Some(40));
    }
}
