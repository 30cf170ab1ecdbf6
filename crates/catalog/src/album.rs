use chrono::{DateTime, Utc};

use albumhub_core::{AlbumId, ArtistId, DomainError, DomainResult, Entity};

use crate::artist::Artist;
use crate::validate::FieldCheck;

/// A persisted album. Always owned by exactly one artist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Album {
    pub id: AlbumId,
    pub title: String,
    pub genre: String,
    pub artist_id: ArtistId,
    pub release_year: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Entity for Album {
    type Id = AlbumId;

    fn id(&self) -> AlbumId {
        self.id
    }
}

/// An album joined with its owning artist, as loaded for rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumWithArtist {
    pub album: Album,
    pub artist: Artist,
}

/// Validated payload for creating an album.
///
/// Built from the whitelisted fields only: title, genre, artist,
/// releaseyear.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAlbum {
    pub title: String,
    pub genre: String,
    pub artist_id: ArtistId,
    pub release_year: String,
}

impl NewAlbum {
    pub fn try_new(
        title: Option<String>,
        genre: Option<String>,
        artist: Option<i64>,
        release_year: Option<String>,
    ) -> DomainResult<Self> {
        let mut check = FieldCheck::new();
        let title = check.required_text("title", title);
        let genre = check.required_text("genre", genre);
        let artist_id = check
            .required("artist", artist)
            .and_then(|id| checked_artist_id(&mut check, id));
        let release_year = check.required_text("releaseyear", release_year);
        check.finish()?;

        match (title, genre, artist_id, release_year) {
            (Some(title), Some(genre), Some(artist_id), Some(release_year)) => Ok(Self {
                title,
                genre,
                artist_id,
                release_year,
            }),
            _ => Err(DomainError::validation("incomplete album payload")),
        }
    }

    pub fn into_album(self, id: AlbumId, now: DateTime<Utc>) -> Album {
        Album {
            id,
            title: self.title,
            genre: self.genre,
            artist_id: self.artist_id,
            release_year: self.release_year,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial album update restricted to the same whitelist as creation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumChanges {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub artist_id: Option<ArtistId>,
    pub release_year: Option<String>,
}

impl AlbumChanges {
    pub fn try_new(
        title: Option<String>,
        genre: Option<String>,
        artist: Option<i64>,
        release_year: Option<String>,
    ) -> DomainResult<Self> {
        let mut check = FieldCheck::new();
        let title = check.optional_text("title", title);
        let genre = check.optional_text("genre", genre);
        let artist_id = artist.and_then(|id| checked_artist_id(&mut check, id));
        let release_year = check.optional_text("releaseyear", release_year);
        check.finish()?;

        Ok(Self {
            title,
            genre,
            artist_id,
            release_year,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.genre.is_none()
            && self.artist_id.is_none()
            && self.release_year.is_none()
    }

    pub fn apply_to(&self, album: &mut Album, now: DateTime<Utc>) {
        if let Some(title) = &self.title {
            album.title = title.clone();
        }
        if let Some(genre) = &self.genre {
            album.genre = genre.clone();
        }
        if let Some(artist_id) = self.artist_id {
            album.artist_id = artist_id;
        }
        if let Some(year) = &self.release_year {
            album.release_year = year.clone();
        }
        album.updated_at = now;
    }
}

fn checked_artist_id(check: &mut FieldCheck, id: i64) -> Option<ArtistId> {
    if id < 1 {
        check.invalid(format!("artist must be a positive id, got {id}"));
        None
    } else {
        Some(ArtistId::new(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genesis() -> Album {
        NewAlbum::try_new(
            Some("genesis".into()),
            Some("punk".into()),
            Some(1),
            Some("2000".into()),
        )
        .unwrap()
        .into_album(AlbumId::new(1), Utc::now())
    }

    #[test]
    fn new_album_requires_every_whitelisted_field() {
        let err = NewAlbum::try_new(Some("genesis".into()), None, None, None).unwrap_err();
        match err {
            DomainError::Validation(msg) => {
                assert!(!msg.contains("title"));
                assert!(msg.contains("genre"));
                assert!(msg.contains("artist"));
                assert!(msg.contains("releaseyear"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn new_album_rejects_non_positive_artist() {
        let err = NewAlbum::try_new(
            Some("genesis".into()),
            Some("punk".into()),
            Some(0),
            Some("2000".into()),
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn changes_leave_unsubmitted_fields_alone() {
        let mut album = genesis();
        let before = album.clone();
        let changes = AlbumChanges::try_new(Some("exodus".into()), None, None, None).unwrap();

        changes.apply_to(&mut album, Utc::now());

        assert_eq!(album.title, "exodus");
        assert_eq!(album.genre, before.genre);
        assert_eq!(album.artist_id, before.artist_id);
        assert_eq!(album.release_year, before.release_year);
        assert_eq!(album.id, before.id);
    }

    #[test]
    fn blank_change_is_rejected() {
        let err = AlbumChanges::try_new(None, Some(" ".into()), None, None).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn no_changes_is_empty() {
        assert!(AlbumChanges::try_new(None, None, None, None).unwrap().is_empty());
    }
}
