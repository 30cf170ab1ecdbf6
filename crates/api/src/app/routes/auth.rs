use std::sync::Arc;

use axum::{
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::json;

use albumhub_auth::{normalize_email, NewUser, PasswordHash, User, UserResource};

use crate::app::extract::ApiJson;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::AuthenticatedUser;

pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::RegisterRequest>,
) -> axum::response::Response {
    let new_user = match NewUser::register(body.name, body.email, body.password) {
        Ok(user) => user,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let user = match services.accounts.create_user(new_user).await {
        Ok(user) => user,
        Err(e) => return errors::store_error_to_response(e),
    };

    tracing::info!(user_id = %user.id, "user registered");
    session_response(&services, &user, StatusCode::CREATED)
}

pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    ApiJson(body): ApiJson<dto::LoginRequest>,
) -> axum::response::Response {
    let found = match services.accounts.find_user_by_email(&normalize_email(&body.email)).await {
        Ok(found) => found,
        Err(e) => return errors::store_error_to_response(e),
    };

    let user = match found {
        Some(user) if user.password_hash.verify(&body.password) => user,
        Some(_) => return invalid_credentials(),
        None => {
            // Same hashing cost as a wrong password for a known account.
            let _ = PasswordHash::dummy().verify(&body.password);
            return invalid_credentials();
        }
    };

    tracing::info!(user_id = %user.id, "user logged in");
    session_response(&services, &user, StatusCode::OK)
}

/// Revoke the presented token for the rest of its lifetime.
pub async fn logout(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> axum::response::Response {
    if let Err(e) = services
        .accounts
        .revoke_token(user.token_id(), user.user_id(), user.token_expires_at())
        .await
    {
        return errors::store_error_to_response(e);
    }

    tracing::info!(user_id = %user.user_id(), "user logged out");
    (StatusCode::OK, Json(json!({ "message": "logged out" }))).into_response()
}

pub async fn current_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(user): Extension<AuthenticatedUser>,
) -> axum::response::Response {
    match services.accounts.get_user(user.user_id()).await {
        Ok(Some(found)) => (StatusCode::OK, Json(UserResource::from(&found))).into_response(),
        // Token outlived its account.
        Ok(None) => errors::json_error(StatusCode::UNAUTHORIZED, "unauthenticated", "unknown user"),
        Err(e) => errors::store_error_to_response(e),
    }
}

fn invalid_credentials() -> axum::response::Response {
    tracing::debug!("login rejected");
    errors::json_error(
        StatusCode::UNAUTHORIZED,
        "invalid_credentials",
        "invalid email or password",
    )
}

fn session_response(services: &AppServices, user: &User, status: StatusCode) -> axum::response::Response {
    match services.tokens.issue(user.id, Utc::now()) {
        Ok(issued) => (
            status,
            Json(json!({
                "user": UserResource::from(user),
                "token": issued.token,
                "token_type": "Bearer",
                "expires_at": issued.claims.expires_at,
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "token signing failed");
            errors::json_error(StatusCode::INTERNAL_SERVER_ERROR, "token_error", e.to_string())
        }
    }
}
