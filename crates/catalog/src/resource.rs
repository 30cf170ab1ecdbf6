//! Canonical JSON shapes of catalog responses.
//!
//! The album shape flattens a snapshot of the owning artist into the album
//! object. `genre` is stored and writable but is not part of the rendered
//! album; clients relying on the current wire format expect that.

use serde::Serialize;

use albumhub_core::{AlbumId, ArtistId, DomainError, DomainResult};

use crate::album::{Album, AlbumWithArtist};
use crate::artist::{Age, Artist};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtistResource {
    pub id: ArtistId,
    pub name: String,
    pub age: Age,
    pub pob: String,
}

impl From<&Artist> for ArtistResource {
    fn from(artist: &Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name.clone(),
            age: artist.age,
            pob: artist.place_of_birth.clone(),
        }
    }
}

impl From<Artist> for ArtistResource {
    fn from(artist: Artist) -> Self {
        Self {
            id: artist.id,
            name: artist.name,
            age: artist.age,
            pob: artist.place_of_birth,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlbumResource {
    pub id: AlbumId,
    pub title: String,
    pub releaseyear: String,
    pub artist_id: ArtistId,
    pub artist_name: String,
    pub artist_age: Age,
    pub artist_pob: String,
}

impl AlbumResource {
    /// Compose the album shape; fails if `artist` is not the album's owner.
    pub fn compose(album: &Album, artist: &Artist) -> DomainResult<Self> {
        if album.artist_id != artist.id {
            return Err(DomainError::invariant(format!(
                "album {} references artist {}, got artist {}",
                album.id, album.artist_id, artist.id
            )));
        }

        Ok(Self {
            id: album.id,
            title: album.title.clone(),
            releaseyear: album.release_year.clone(),
            artist_id: artist.id,
            artist_name: artist.name.clone(),
            artist_age: artist.age,
            artist_pob: artist.place_of_birth.clone(),
        })
    }
}

impl TryFrom<&AlbumWithArtist> for AlbumResource {
    type Error = DomainError;

    fn try_from(record: &AlbumWithArtist) -> DomainResult<Self> {
        Self::compose(&record.album, &record.artist)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    use crate::album::NewAlbum;
    use crate::artist::NewArtist;

    fn artist(id: i64, name: &str, age: i64, pob: &str) -> Artist {
        NewArtist::try_new(Some(name.into()), Some(age), Some(pob.into()))
            .unwrap()
            .into_artist(ArtistId::new(id), Utc::now())
    }

    fn album(id: i64, artist: i64, genre: &str) -> Album {
        NewAlbum::try_new(
            Some("genesis".into()),
            Some(genre.into()),
            Some(artist),
            Some("2000".into()),
        )
        .unwrap()
        .into_album(AlbumId::new(id), Utc::now())
    }

    #[test]
    fn album_shape_matches_wire_format() {
        let resource = AlbumResource::compose(&album(5, 1, "punk"), &artist(1, "t-dog", 40, "LA")).unwrap();
        let json = serde_json::to_value(resource).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "id": 5,
                "title": "genesis",
                "releaseyear": "2000",
                "artist_id": 1,
                "artist_name": "t-dog",
                "artist_age": "40",
                "artist_pob": "LA",
            })
        );
    }

    #[test]
    fn composing_with_the_wrong_artist_fails() {
        let err = AlbumResource::compose(&album(5, 1, "punk"), &artist(2, "other", 30, "NYC")).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn artist_shape_uses_pob() {
        let json = serde_json::to_value(ArtistResource::from(artist(1, "t-dog", 40, "LA"))).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"id": 1, "name": "t-dog", "age": "40", "pob": "LA"})
        );
    }

    proptest! {
        #[test]
        fn album_shape_never_exposes_genre(
            genre in "[a-z]{1,16}",
            name in "[A-Za-z][A-Za-z -]{0,30}",
            age in 0i64..120,
            artist_id in 1i64..10_000,
        ) {
            let owner = artist(artist_id, &name, age, "LA");
            let record = AlbumWithArtist { album: album(1, artist_id, &genre), artist: owner.clone() };
            let json = serde_json::to_value(AlbumResource::try_from(&record).unwrap()).unwrap();
            let object = json.as_object().unwrap();

            prop_assert!(!object.contains_key("genre"));
            prop_assert_eq!(object["artist_id"].as_i64(), Some(artist_id));
            prop_assert_eq!(object["artist_name"].as_str(), Some(owner.name.as_str()));
            let rendered_age = age.to_string();
            prop_assert_eq!(object["artist_age"].as_str(), Some(rendered_age.as_str()));
            prop_assert_eq!(object["artist_pob"].as_str(), Some("LA"));
        }
    }
}
