//! Postgres-backed catalog and account store.
//!
//! ## Error Mapping
//!
//! | PostgreSQL Error Code | StoreError | Scenario |
//! |----------------------|------------|----------|
//! | `23503` (foreign key violation) | `UnknownArtist` | Album written with a missing artist id |
//! | `23505` (unique violation) | `Conflict` | Registration with an e-mail already in use |
//! | Any other / pool errors | `Storage` | Network errors, closed pool, bad SQL |
//!
//! ## Thread Safety
//!
//! `PostgresStore` is `Send + Sync`; connection management is left to the
//! SQLx pool. Every write is a single statement, so it is atomic without an
//! explicit transaction.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use tracing::instrument;
use uuid::Uuid;

use albumhub_auth::{NewUser, PasswordHash, User};
use albumhub_catalog::{
    Age, Album, AlbumChanges, AlbumWithArtist, Artist, ArtistChanges, NewAlbum, NewArtist,
};
use albumhub_core::{AlbumId, ArtistId, Page, PageRequest, UserId};

use super::{AccountStore, CatalogStore, StoreError};

/// Idempotent bootstrap schema, applied by [`PostgresStore::bootstrap`].
const SCHEMA: &str = include_str!("schema.sql");

const FOREIGN_KEY_VIOLATION: &str = "23503";
const UNIQUE_VIOLATION: &str = "23505";

/// Album columns joined with the owning artist's columns.
const ALBUM_SELECT: &str = r#"
    SELECT
        al.id,
        al.title,
        al.genre,
        al.artist_id,
        al.release_year,
        al.created_at,
        al.updated_at,
        ar.name AS artist_name,
        ar.age AS artist_age,
        ar.place_of_birth AS artist_pob,
        ar.created_at AS artist_created_at,
        ar.updated_at AS artist_updated_at
    FROM albums al
    JOIN artists ar ON ar.id = al.artist_id
"#;

#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: Arc<PgPool>,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool: Arc::new(pool) }
    }

    /// Open a connection pool against `database_url`.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the tables if they do not exist yet.
    #[instrument(skip(self), err)]
    pub async fn bootstrap(&self) -> Result<(), StoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("bootstrap", e))?;
        Ok(())
    }

    async fn fetch_album(&self, id: AlbumId) -> Result<Option<AlbumWithArtist>, StoreError> {
        let row = sqlx::query(&format!("{ALBUM_SELECT} WHERE al.id = $1"))
            .bind(id.get())
            .fetch_optional(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("get_album", e))?;
        row.as_ref().map(album_from_row).transpose()
    }
}

#[async_trait::async_trait]
impl CatalogStore for PostgresStore {
    #[instrument(skip(self, page), fields(page = page.page()), err)]
    async fn list_artists(&self, page: PageRequest) -> Result<Page<Artist>, StoreError> {
        let total: i64 = sqlx::query("SELECT COUNT(*) AS total FROM artists")
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get("total"))
            .map_err(|e| map_sqlx_error("count_artists", e))?;

        let rows = sqlx::query(
            r#"
            SELECT id, name, age, place_of_birth, created_at, updated_at
            FROM artists
            ORDER BY id ASC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(i64::try_from(page.per_page()).unwrap_or(i64::MAX))
        .bind(i64::try_from(page.offset()).unwrap_or(i64::MAX))
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("list_artists", e))?;

        let items = rows.iter().map(artist_from_row).collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total.max(0) as u64, page))
    }

    #[instrument(skip(self), fields(artist_id = %id), err)]
    async fn get_artist(&self, id: ArtistId) -> Result<Option<Artist>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, age, place_of_birth, created_at, updated_at
            FROM artists
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_artist", e))?;

        row.as_ref().map(artist_from_row).transpose()
    }

    #[instrument(skip(self, artist), err)]
    async fn create_artist(&self, artist: NewArtist) -> Result<Artist, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO artists (name, age, place_of_birth)
            VALUES ($1, $2, $3)
            RETURNING id, name, age, place_of_birth, created_at, updated_at
            "#,
        )
        .bind(&artist.name)
        .bind(artist.age.years() as i32)
        .bind(&artist.place_of_birth)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("create_artist", e))?;

        artist_from_row(&row)
    }

    #[instrument(skip(self, changes), fields(artist_id = %id), err)]
    async fn update_artist(&self, id: ArtistId, changes: ArtistChanges) -> Result<Option<Artist>, StoreError> {
        let row = sqlx::query(
            r#"
            UPDATE artists SET
                name = COALESCE($2, name),
                age = COALESCE($3, age),
                place_of_birth = COALESCE($4, place_of_birth),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id, name, age, place_of_birth, created_at, updated_at
            "#,
        )
        .bind(id.get())
        .bind(changes.name.as_deref())
        .bind(changes.age.map(|a| a.years() as i32))
        .bind(changes.place_of_birth.as_deref())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("update_artist", e))?;

        row.as_ref().map(artist_from_row).transpose()
    }

    #[instrument(skip(self), fields(artist_id = %id), err)]
    async fn delete_artist(&self, id: ArtistId) -> Result<bool, StoreError> {
        // Owned albums go with it (ON DELETE CASCADE).
        let result = sqlx::query("DELETE FROM artists WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_artist", e))?;
        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self), err)]
    async fn list_albums(&self) -> Result<Vec<AlbumWithArtist>, StoreError> {
        let rows = sqlx::query(&format!("{ALBUM_SELECT} ORDER BY al.id ASC"))
            .fetch_all(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("list_albums", e))?;

        rows.iter().map(album_from_row).collect()
    }

    #[instrument(skip(self), fields(album_id = %id), err)]
    async fn get_album(&self, id: AlbumId) -> Result<Option<AlbumWithArtist>, StoreError> {
        self.fetch_album(id).await
    }

    #[instrument(skip(self, album), fields(artist_id = %album.artist_id), err)]
    async fn create_album(&self, album: NewAlbum) -> Result<AlbumWithArtist, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO albums (title, genre, artist_id, release_year)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&album.title)
        .bind(&album.genre)
        .bind(album.artist_id.get())
        .bind(&album.release_year)
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| map_album_write_error("create_album", e, album.artist_id))?;

        let id: i64 = row
            .try_get("id")
            .map_err(|e| map_sqlx_error("create_album", e))?;

        // Deleting the artist between the two statements is the only way to
        // get here without a row.
        self.fetch_album(AlbumId::new(id))
            .await?
            .ok_or(StoreError::UnknownArtist(album.artist_id))
    }

    #[instrument(skip(self, changes), fields(album_id = %id), err)]
    async fn update_album(&self, id: AlbumId, changes: AlbumChanges) -> Result<Option<AlbumWithArtist>, StoreError> {
        let updated = sqlx::query(
            r#"
            UPDATE albums SET
                title = COALESCE($2, title),
                genre = COALESCE($3, genre),
                artist_id = COALESCE($4, artist_id),
                release_year = COALESCE($5, release_year),
                updated_at = NOW()
            WHERE id = $1
            RETURNING id
            "#,
        )
        .bind(id.get())
        .bind(changes.title.as_deref())
        .bind(changes.genre.as_deref())
        .bind(changes.artist_id.map(|a| a.get()))
        .bind(changes.release_year.as_deref())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| match changes.artist_id {
            Some(artist_id) => map_album_write_error("update_album", e, artist_id),
            None => map_sqlx_error("update_album", e),
        })?;

        match updated {
            Some(_) => self.fetch_album(id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self), fields(album_id = %id), err)]
    async fn delete_album(&self, id: AlbumId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM albums WHERE id = $1")
            .bind(id.get())
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete_album", e))?;
        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl AccountStore for PostgresStore {
    #[instrument(skip(self, user), err)]
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (name, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_hash.as_str())
        .fetch_one(&*self.pool)
        .await
        .map_err(|e| {
            if has_code(&e, UNIQUE_VIOLATION) {
                StoreError::Conflict(format!("email already registered: {}", user.email))
            } else {
                map_sqlx_error("create_user", e)
            }
        })?;

        user_from_row(&row)
    }

    #[instrument(skip(self, email), err)]
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("find_user_by_email", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %id), err)]
    async fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, password_hash, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id.get())
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get_user", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self), fields(user_id = %user_id), err)]
    async fn revoke_token(&self, jti: Uuid, user_id: UserId, expires_at: DateTime<Utc>) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM revoked_tokens WHERE expires_at < NOW()")
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("prune_revoked_tokens", e))?;

        sqlx::query(
            r#"
            INSERT INTO revoked_tokens (jti, user_id, expires_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (jti) DO NOTHING
            "#,
        )
        .bind(jti)
        .bind(user_id.get())
        .bind(expires_at)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("revoke_token", e))?;
        Ok(())
    }

    async fn is_token_revoked(&self, jti: Uuid) -> Result<bool, StoreError> {
        sqlx::query("SELECT EXISTS (SELECT 1 FROM revoked_tokens WHERE jti = $1) AS revoked")
            .bind(jti)
            .fetch_one(&*self.pool)
            .await
            .and_then(|row| row.try_get("revoked"))
            .map_err(|e| map_sqlx_error("is_token_revoked", e))
    }
}

fn artist_from_row(row: &PgRow) -> Result<Artist, StoreError> {
    decode_artist(row, "id", "name", "age", "place_of_birth", "created_at", "updated_at")
}

fn album_from_row(row: &PgRow) -> Result<AlbumWithArtist, StoreError> {
    let album = (|| {
        Ok::<_, sqlx::Error>(Album {
            id: AlbumId::new(row.try_get("id")?),
            title: row.try_get("title")?,
            genre: row.try_get("genre")?,
            artist_id: ArtistId::new(row.try_get("artist_id")?),
            release_year: row.try_get("release_year")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    })()
    .map_err(|e| map_sqlx_error("decode_album", e))?;

    let artist = decode_artist(
        row,
        "artist_id",
        "artist_name",
        "artist_age",
        "artist_pob",
        "artist_created_at",
        "artist_updated_at",
    )?;

    Ok(AlbumWithArtist { album, artist })
}

fn decode_artist(
    row: &PgRow,
    id: &str,
    name: &str,
    age: &str,
    pob: &str,
    created_at: &str,
    updated_at: &str,
) -> Result<Artist, StoreError> {
    let decode = || {
        Ok::<_, sqlx::Error>((
            row.try_get::<i64, _>(id)?,
            row.try_get::<String, _>(name)?,
            row.try_get::<i32, _>(age)?,
            row.try_get::<String, _>(pob)?,
            row.try_get::<DateTime<Utc>, _>(created_at)?,
            row.try_get::<DateTime<Utc>, _>(updated_at)?,
        ))
    };
    let (id, name, age, place_of_birth, created_at, updated_at) =
        decode().map_err(|e| map_sqlx_error("decode_artist", e))?;

    let age = Age::new(i64::from(age)).map_err(|e| StoreError::Integrity(format!("artist {id}: {e}")))?;

    Ok(Artist {
        id: ArtistId::new(id),
        name,
        age,
        place_of_birth,
        created_at,
        updated_at,
    })
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    (|| {
        Ok::<_, sqlx::Error>(User {
            id: UserId::new(row.try_get("id")?),
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            password_hash: PasswordHash::from_stored(row.try_get::<String, _>("password_hash")?),
            created_at: row.try_get("created_at")?,
        })
    })()
    .map_err(|e| map_sqlx_error("decode_user", e))
}

fn has_code(err: &sqlx::Error, code: &str) -> bool {
    err.as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|c| c == code)
}

fn map_album_write_error(operation: &str, err: sqlx::Error, artist_id: ArtistId) -> StoreError {
    if has_code(&err, FOREIGN_KEY_VIOLATION) {
        StoreError::UnknownArtist(artist_id)
    } else {
        map_sqlx_error(operation, err)
    }
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    StoreError::Storage(format!("{operation}: {err}"))
}
