use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use albumhub_catalog::{AlbumChanges, AlbumResource, AlbumWithArtist, NewAlbum};
use albumhub_core::AlbumId;

use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthenticatedUser;

pub async fn list_albums(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    let records = match services.catalog.list_albums().await {
        Ok(records) => records,
        Err(e) => return errors::store_error_to_response(e),
    };

    match records
        .iter()
        .map(AlbumResource::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(items) => (StatusCode::OK, Json(items)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn get_album(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<AlbumId>() else {
        return errors::not_found();
    };

    match services.catalog.get_album(id).await {
        Ok(Some(record)) => render(&record, StatusCode::OK),
        Ok(None) => errors::not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_album(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<dto::AlbumPayload>,
) -> axum::response::Response {
    let artist = body.artist();
    let album = match NewAlbum::try_new(body.title, body.genre, artist, body.releaseyear.map(|y| y.0)) {
        Ok(album) => album,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.catalog.create_album(album).await {
        Ok(record) => {
            tracing::info!(
                album_id = %record.album.id,
                artist_id = %record.artist.id,
                user_id = %user.user_id(),
                "album created"
            );
            render(&record, StatusCode::CREATED)
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT and PATCH: overwrite the submitted whitelisted fields.
pub async fn update_album(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::AlbumPayload>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<AlbumId>() else {
        return errors::not_found();
    };

    let artist = body.artist();
    let changes = match AlbumChanges::try_new(body.title, body.genre, artist, body.releaseyear.map(|y| y.0)) {
        Ok(changes) => changes,
        Err(e) => return errors::domain_error_to_response(e),
    };

    // Nothing writable submitted: answer with the stored record.
    if changes.is_empty() {
        return match services.catalog.get_album(id).await {
            Ok(Some(record)) => render(&record, StatusCode::OK),
            Ok(None) => errors::not_found(),
            Err(e) => errors::store_error_to_response(e),
        };
    }

    match services.catalog.update_album(id, changes).await {
        Ok(Some(record)) => {
            tracing::info!(album_id = %id, user_id = %user.user_id(), "album updated");
            render(&record, StatusCode::OK)
        }
        Ok(None) => errors::not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_album(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<AlbumId>() else {
        return errors::not_found();
    };

    match services.catalog.delete_album(id).await {
        Ok(true) => {
            tracing::info!(album_id = %id, user_id = %user.user_id(), "album deleted");
            StatusCode::NO_CONTENT.into_response()
        }
        Ok(false) => errors::not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn render(record: &AlbumWithArtist, status: StatusCode) -> axum::response::Response {
    match AlbumResource::try_from(record) {
        Ok(resource) => (status, Json(resource)).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
