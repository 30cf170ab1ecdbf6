//! Persistence ports for the catalog and for accounts, with in-memory and
//! Postgres adapters.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use albumhub_auth::{NewUser, User};
use albumhub_catalog::{AlbumChanges, AlbumWithArtist, Artist, ArtistChanges, NewAlbum, NewArtist};
use albumhub_core::{AlbumId, ArtistId, Page, PageRequest, UserId};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryStore;
pub use postgres::PostgresStore;

/// Store error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// An album write referenced an artist that does not exist.
    #[error("artist not found: {0}")]
    UnknownArtist(ArtistId),
    /// A uniqueness constraint rejected the write.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Stored data broke an invariant (e.g. an album without its artist).
    #[error("integrity violation: {0}")]
    Integrity(String),
    #[error("storage error: {0}")]
    Storage(String),
}

/// Artists and albums.
///
/// Lookups return `Ok(None)` (or `Ok(false)` for deletes) when the id does
/// not resolve; errors are reserved for failed writes and backend faults.
#[async_trait::async_trait]
pub trait CatalogStore: Send + Sync {
    /// One page of artists ordered by id, plus the total artist count.
    async fn list_artists(&self, page: PageRequest) -> Result<Page<Artist>, StoreError>;

    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, StoreError>;

    async fn create_artist(&self, artist: NewArtist) -> Result<Artist, StoreError>;

    async fn update_artist(&self, id: ArtistId, changes: ArtistChanges) -> Result<Option<Artist>, StoreError>;

    /// Deletes the artist and every album they own.
    async fn delete_artist(&self, id: ArtistId) -> Result<bool, StoreError>;

    /// Every album joined with its artist, ordered by album id.
    async fn list_albums(&self) -> Result<Vec<AlbumWithArtist>, StoreError>;

    async fn get_album(&self, id: AlbumId) -> Result<Option<AlbumWithArtist>, StoreError>;

    /// Fails with [`StoreError::UnknownArtist`] if the artist does not exist.
    async fn create_album(&self, album: NewAlbum) -> Result<AlbumWithArtist, StoreError>;

    /// Fails with [`StoreError::UnknownArtist`] if the changes point the album
    /// at an artist that does not exist.
    async fn update_album(&self, id: AlbumId, changes: AlbumChanges) -> Result<Option<AlbumWithArtist>, StoreError>;

    async fn delete_album(&self, id: AlbumId) -> Result<bool, StoreError>;
}

/// Registered users and revoked bearer tokens.
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    /// Fails with [`StoreError::Conflict`] if the e-mail is already taken.
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;

    /// `email` must already be normalized.
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Mark a token id as revoked until it would have expired anyway.
    async fn revoke_token(&self, jti: Uuid, user_id: UserId, expires_at: DateTime<Utc>) -> Result<(), StoreError>;

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, StoreError>;
}
