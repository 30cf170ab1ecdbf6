use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use albumhub_auth::{NewUser, User};
use albumhub_catalog::{
    Album, AlbumChanges, AlbumWithArtist, Artist, ArtistChanges, NewAlbum, NewArtist,
};
use albumhub_core::{AlbumId, ArtistId, Entity, Page, PageRequest, UserId};

use super::{AccountStore, CatalogStore, StoreError};

/// Auto-increment table keyed by entity id. Ids start at 1 and are never
/// reused.
#[derive(Debug)]
struct Table<E: Entity> {
    rows: BTreeMap<E::Id, E>,
    last_id: i64,
}

impl<E: Entity> Table<E> {
    fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }

    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn insert(&mut self, row: E) {
        self.rows.insert(row.id(), row);
    }

    fn get(&self, id: E::Id) -> Option<&E> {
        self.rows.get(&id)
    }

    fn get_mut(&mut self, id: E::Id) -> Option<&mut E> {
        self.rows.get_mut(&id)
    }

    fn remove(&mut self, id: E::Id) -> Option<E> {
        self.rows.remove(&id)
    }

    fn values(&self) -> impl Iterator<Item = &E> {
        self.rows.values()
    }

    fn len(&self) -> usize {
        self.rows.len()
    }
}

#[derive(Debug)]
struct Tables {
    artists: Table<Artist>,
    albums: Table<Album>,
    users: Table<User>,
    revoked_tokens: HashMap<Uuid, DateTime<Utc>>,
}

impl Tables {
    fn join(&self, album: &Album) -> Result<AlbumWithArtist, StoreError> {
        let artist = self.artists.get(album.artist_id).ok_or_else(|| {
            StoreError::Integrity(format!(
                "album {} references missing artist {}",
                album.id, album.artist_id
            ))
        })?;
        Ok(AlbumWithArtist {
            album: album.clone(),
            artist: artist.clone(),
        })
    }

    fn ensure_artist(&self, id: ArtistId) -> Result<(), StoreError> {
        if self.artists.get(id).is_some() {
            Ok(())
        } else {
            Err(StoreError::UnknownArtist(id))
        }
    }
}

/// In-memory catalog and account store for tests/dev.
///
/// Mirrors the relational rules of the Postgres schema: album writes check
/// the artist reference, deleting an artist deletes their albums, e-mails
/// are unique.
#[derive(Debug)]
pub struct InMemoryStore {
    inner: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Tables {
                artists: Table::new(),
                albums: Table::new(),
                users: Table::new(),
                revoked_tokens: HashMap::new(),
            }),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Tables>, StoreError> {
        self.inner
            .read()
            .map_err(|_| StoreError::Storage("in-memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Tables>, StoreError> {
        self.inner
            .write()
            .map_err(|_| StoreError::Storage("in-memory store lock poisoned".to_string()))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl CatalogStore for InMemoryStore {
    async fn list_artists(&self, page: PageRequest) -> Result<Page<Artist>, StoreError> {
        let tables = self.read()?;
        let items = tables
            .artists
            .values()
            .skip(usize::try_from(page.offset()).unwrap_or(usize::MAX))
            .take(page.per_page() as usize)
            .cloned()
            .collect();
        Ok(Page::new(items, tables.artists.len() as u64, page))
    }

    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, StoreError> {
        Ok(self.read()?.artists.get(id).cloned())
    }

    async fn create_artist(&self, artist: NewArtist) -> Result<Artist, StoreError> {
        let mut tables = self.write()?;
        let id = ArtistId::new(tables.artists.next_id());
        let artist = artist.into_artist(id, Utc::now());
        tables.artists.insert(artist.clone());
        Ok(artist)
    }

    async fn update_artist(&self, id: ArtistId, changes: ArtistChanges) -> Result<Option<Artist>, StoreError> {
        let mut tables = self.write()?;
        Ok(tables.artists.get_mut(id).map(|artist| {
            changes.apply_to(artist, Utc::now());
            artist.clone()
        }))
    }

    async fn delete_artist(&self, id: ArtistId) -> Result<bool, StoreError> {
        let mut tables = self.write()?;
        if tables.artists.remove(id).is_none() {
            return Ok(false);
        }
        tables.albums.rows.retain(|_, album| album.artist_id != id);
        Ok(true)
    }

    async fn list_albums(&self) -> Result<Vec<AlbumWithArtist>, StoreError> {
        let tables = self.read()?;
        tables.albums.values().map(|album| tables.join(album)).collect()
    }

    async fn get_album(&self, id: AlbumId) -> Result<Option<AlbumWithArtist>, StoreError> {
        let tables = self.read()?;
        tables.albums.get(id).map(|album| tables.join(album)).transpose()
    }

    async fn create_album(&self, album: NewAlbum) -> Result<AlbumWithArtist, StoreError> {
        let mut tables = self.write()?;
        tables.ensure_artist(album.artist_id)?;

        let id = AlbumId::new(tables.albums.next_id());
        let album = album.into_album(id, Utc::now());
        let joined = tables.join(&album)?;
        tables.albums.insert(album);
        Ok(joined)
    }

    async fn update_album(&self, id: AlbumId, changes: AlbumChanges) -> Result<Option<AlbumWithArtist>, StoreError> {
        let mut tables = self.write()?;
        if tables.albums.get(id).is_none() {
            return Ok(None);
        }
        if let Some(artist_id) = changes.artist_id {
            tables.ensure_artist(artist_id)?;
        }

        let Some(album) = tables.albums.get_mut(id) else {
            return Ok(None);
        };
        changes.apply_to(album, Utc::now());
        let album = album.clone();
        tables.join(&album).map(Some)
    }

    async fn delete_album(&self, id: AlbumId) -> Result<bool, StoreError> {
        Ok(self.write()?.albums.remove(id).is_some())
    }
}

#[async_trait::async_trait]
impl AccountStore for InMemoryStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.write()?;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(format!("email already registered: {}", user.email)));
        }

        let id = UserId::new(tables.users.next_id());
        let user = user.into_user(id, Utc::now());
        tables.users.insert(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.values().find(|u| u.email == email).cloned())
    }

    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.users.get(id).cloned())
    }

    async fn revoke_token(&self, jti: Uuid, _user_id: UserId, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut tables = self.write()?;
        let now = Utc::now();
        tables.revoked_tokens.retain(|_, exp| *exp > now);
        tables.revoked_tokens.insert(jti, expires_at);
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, StoreError> {
        Ok(self.read()?.revoked_tokens.contains_key(&jti))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn artist(store: &InMemoryStore, name: &str) -> Artist {
        store
            .create_artist(NewArtist::try_new(Some(name.into()), Some(40), Some("LA".into())).unwrap())
            .await
            .unwrap()
    }

    fn new_album(title: &str, artist: ArtistId) -> NewAlbum {
        NewAlbum::try_new(
            Some(title.into()),
            Some("punk".into()),
            Some(artist.get()),
            Some("2000".into()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn ids_start_at_one_and_increase() {
        let store = InMemoryStore::new();
        assert_eq!(artist(&store, "a").await.id, ArtistId::new(1));
        assert_eq!(artist(&store, "b").await.id, ArtistId::new(2));
    }

    #[tokio::test]
    async fn album_is_joined_with_its_artist() {
        let store = InMemoryStore::new();
        let owner = artist(&store, "t-dog").await;

        let created = store.create_album(new_album("genesis", owner.id)).await.unwrap();
        assert_eq!(created.artist, owner);

        let fetched = store.get_album(created.album.id).await.unwrap().unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn album_with_unknown_artist_is_rejected() {
        let store = InMemoryStore::new();
        let err = store.create_album(new_album("genesis", ArtistId::new(9))).await.unwrap_err();
        assert_eq!(err, StoreError::UnknownArtist(ArtistId::new(9)));
        assert!(store.list_albums().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_album_checks_new_artist_and_keeps_record_on_failure() {
        let store = InMemoryStore::new();
        let owner = artist(&store, "t-dog").await;
        let created = store.create_album(new_album("genesis", owner.id)).await.unwrap();

        let changes = AlbumChanges::try_new(Some("exodus".into()), None, Some(42), None).unwrap();
        let err = store.update_album(created.album.id, changes).await.unwrap_err();
        assert_eq!(err, StoreError::UnknownArtist(ArtistId::new(42)));

        let unchanged = store.get_album(created.album.id).await.unwrap().unwrap();
        assert_eq!(unchanged.album.title, "genesis");
    }

    #[tokio::test]
    async fn update_missing_rows_returns_none() {
        let store = InMemoryStore::new();
        assert!(store
            .update_album(AlbumId::new(1), AlbumChanges::default())
            .await
            .unwrap()
            .is_none());
        assert!(store
            .update_artist(ArtistId::new(1), ArtistChanges::default())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn deleting_missing_rows_reports_false() {
        let store = InMemoryStore::new();
        let owner = artist(&store, "t-dog").await;
        let created = store.create_album(new_album("genesis", owner.id)).await.unwrap();

        assert!(store.delete_album(created.album.id).await.unwrap());
        assert!(!store.delete_album(created.album.id).await.unwrap());
        assert!(!store.delete_album(AlbumId::new(99)).await.unwrap());
        assert!(!store.delete_artist(ArtistId::new(99)).await.unwrap());
    }

    #[tokio::test]
    async fn deleting_an_artist_cascades_to_albums() {
        let store = InMemoryStore::new();
        let keep = artist(&store, "keep").await;
        let gone = artist(&store, "gone").await;
        store.create_album(new_album("one", gone.id)).await.unwrap();
        store.create_album(new_album("two", keep.id)).await.unwrap();

        assert!(store.delete_artist(gone.id).await.unwrap());
        assert!(!store.delete_artist(gone.id).await.unwrap());

        let albums = store.list_albums().await.unwrap();
        assert_eq!(albums.len(), 1);
        assert_eq!(albums[0].artist.id, keep.id);
    }

    #[tokio::test]
    async fn artist_pages_hold_one_row_each() {
        let store = InMemoryStore::new();
        for name in ["a", "b", "c"] {
            artist(&store, name).await;
        }

        let page = store.list_artists(PageRequest::new(Some(2), 1)).await.unwrap();
        assert_eq!(page.total, 3);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].name, "b");

        let past_end = store.list_artists(PageRequest::new(Some(4), 1)).await.unwrap();
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total, 3);
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = InMemoryStore::new();
        let user = || NewUser::register(Some("Ada".into()), Some("ada@example.com".into()), Some("password1".into())).unwrap();

        let created = store.create_user(user()).await.unwrap();
        assert!(matches!(store.create_user(user()).await, Err(StoreError::Conflict(_))));

        let found = store.find_user_by_email("ada@example.com").await.unwrap().unwrap();
        assert_eq!(found.id, created.id);
    }

    #[tokio::test]
    async fn revoked_tokens_are_remembered() {
        let store = InMemoryStore::new();
        let jti = Uuid::new_v4();
        assert!(!store.is_token_revoked(jti).await.unwrap());

        store
            .revoke_token(jti, UserId::new(1), Utc::now() + Duration::minutes(5))
            .await
            .unwrap();
        assert!(store.is_token_revoked(jti).await.unwrap());
    }
}
