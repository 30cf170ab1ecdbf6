use axum::{
    routing::{get, post, put},
    Router,
};

pub mod albums;
pub mod artists;
pub mod auth;
pub mod system;

/// Endpoints open to anonymous clients: catalog reads and sign-in.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .route("/albums", get(albums::list_albums))
        .route("/albums/:id", get(albums::get_album))
        .route("/artists", get(artists::list_artists))
        .route("/artists/:id", get(artists::get_artist))
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
}

/// Endpoints behind the bearer-token gate. Shares paths with
/// [`public_router`]; the two are merged per method.
pub fn protected_router() -> Router {
    Router::new()
        .route("/albums", post(albums::create_album))
        .route(
            "/albums/:id",
            put(albums::update_album)
                .patch(albums::update_album)
                .delete(albums::delete_album),
        )
        .route("/artists", post(artists::create_artist))
        .route(
            "/artists/:id",
            put(artists::update_artist)
                .patch(artists::update_artist)
                .delete(artists::delete_artist),
        )
        .route("/auth/logout", post(auth::logout))
        .route("/auth/user", get(auth::current_user))
        .route("/user", get(auth::current_user))
}
