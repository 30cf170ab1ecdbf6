use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use albumhub_core::DomainError;
use albumhub_infra::StoreError;

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::UnknownArtist(id) => json_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "unknown_artist",
            format!("artist {id} does not exist"),
        ),
        StoreError::Conflict(msg) => json_error(StatusCode::CONFLICT, "conflict", msg),
        StoreError::Integrity(msg) => {
            tracing::error!(error = %msg, "catalog integrity violation");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
        StoreError::Storage(msg) => {
            tracing::warn!(error = %msg, "store operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", msg)
        }
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::Validation(msg) => {
            json_error(StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg)
        }
        DomainError::InvalidId(_) => not_found(),
        DomainError::InvariantViolation(msg) => {
            tracing::error!(error = %msg, "invariant violation while rendering");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "invariant_violation", msg)
        }
    }
}

/// 404 with an empty body.
pub fn not_found() -> axum::response::Response {
    StatusCode::NOT_FOUND.into_response()
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use albumhub_core::ArtistId;

    #[test]
    fn store_errors_map_to_statuses() {
        assert_eq!(
            store_error_to_response(StoreError::UnknownArtist(ArtistId::new(9))).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            store_error_to_response(StoreError::Conflict("email".into())).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            store_error_to_response(StoreError::Storage("down".into())).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn domain_errors_map_to_statuses() {
        assert_eq!(
            domain_error_to_response(DomainError::validation("title is required")).status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            domain_error_to_response(DomainError::invalid_id("abc")).status(),
            StatusCode::NOT_FOUND
        );
    }
}
