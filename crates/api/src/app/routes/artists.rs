use std::sync::Arc;

use axum::{
    extract::{Extension, OriginalUri, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use albumhub_catalog::{ArtistChanges, ArtistResource, NewArtist, ARTISTS_PER_PAGE};
use albumhub_core::{ArtistId, PageRequest};

use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthenticatedUser;

/// One artist per page, wrapped in the `data`/`links`/`meta` envelope.
pub async fn list_artists(
    Extension(services): Extension<Arc<AppServices>>,
    OriginalUri(uri): OriginalUri,
    Query(query): Query<dto::PageQuery>,
) -> axum::response::Response {
    let request = PageRequest::new(query.page(), ARTISTS_PER_PAGE);

    match services.catalog.list_artists(request).await {
        Ok(page) => {
            let body = page.map(ArtistResource::from).into_body(uri.path());
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_artist(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<ArtistId>() else {
        return errors::not_found();
    };

    match services.catalog.get_artist(id).await {
        Ok(Some(artist)) => (StatusCode::OK, Json(ArtistResource::from(artist))).into_response(),
        Ok(None) => errors::not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_artist(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    ApiJson(body): ApiJson<dto::ArtistPayload>,
) -> axum::response::Response {
    let age = body.age();
    let artist = match NewArtist::try_new(body.name, age, body.pob) {
        Ok(artist) => artist,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.catalog.create_artist(artist).await {
        Ok(artist) => {
            tracing::info!(artist_id = %artist.id, user_id = %user.user_id(), "artist created");
            (StatusCode::CREATED, Json(ArtistResource::from(artist))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

/// PUT and PATCH. Responds `200` with an empty body.
pub async fn update_artist(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<dto::ArtistPayload>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<ArtistId>() else {
        return errors::not_found();
    };

    let age = body.age();
    let changes = match ArtistChanges::try_new(body.name, age, body.pob) {
        Ok(changes) => changes,
        Err(e) => return errors::domain_error_to_response(e),
    };

    if changes.is_empty() {
        return match services.catalog.get_artist(id).await {
            Ok(Some(_)) => StatusCode::OK.into_response(),
            Ok(None) => errors::not_found(),
            Err(e) => errors::store_error_to_response(e),
        };
    }

    match services.catalog.update_artist(id, changes).await {
        Ok(Some(_)) => {
            tracing::info!(artist_id = %id, user_id = %user.user_id(), "artist updated");
            StatusCode::OK.into_response()
        }
        Ok(None) => errors::not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}

/// Deletes the artist and every album they own. Responds `200` with an
/// empty body.
pub async fn delete_artist(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let Ok(id) = id.parse::<ArtistId>() else {
        return errors::not_found();
    };

    match services.catalog.delete_artist(id).await {
        Ok(true) => {
            tracing::info!(artist_id = %id, user_id = %user.user_id(), "artist deleted");
            StatusCode::OK.into_response()
        }
        Ok(false) => errors::not_found(),
        Err(e) => errors::store_error_to_response(e),
    }
}
