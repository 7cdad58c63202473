// Route exports
pub mod auth;
pub mod matches;
pub mod moderation;
pub mod profiles;
pub mod relations;

use actix_web::{error, http::StatusCode, web, HttpResponse, ResponseError};
use std::fmt;
use std::sync::Arc;

use crate::core::{ConversationLog, MatchError, Matcher, MatchingPolicy, ProfileDirectory};
use crate::models::ErrorResponse;
use crate::services::RelationshipStore;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn RelationshipStore>,
    pub matcher: Matcher,
    pub conversations: ConversationLog,
    pub profiles: ProfileDirectory,
    pub jwt_secret: Arc<str>,
}

impl AppState {
    pub fn new(store: Arc<dyn RelationshipStore>, policy: MatchingPolicy, jwt_secret: &str) -> Self {
        Self {
            matcher: Matcher::new(store.clone(), policy),
            conversations: ConversationLog::new(store.clone()),
            profiles: ProfileDirectory::new(store.clone()),
            store,
            jwt_secret: Arc::from(jwt_secret),
        }
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .configure(profiles::configure)
            .configure(relations::configure)
            .configure(matches::configure)
            .configure(moderation::configure),
    );
}

fn error_body(status: StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

impl ResponseError for MatchError {
    fn status_code(&self) -> StatusCode {
        match self {
            MatchError::NotFound(_) => StatusCode::NOT_FOUND,
            MatchError::Conflict(_) | MatchError::RaceLost(_) => StatusCode::CONFLICT,
            MatchError::Forbidden(_) | MatchError::NotEligible(_) => StatusCode::FORBIDDEN,
            MatchError::InvalidOperation(_) => StatusCode::BAD_REQUEST,
            MatchError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self);
            // storage details stay in the log
            return error_body(status, self.code(), "internal storage error".to_string());
        }
        error_body(status, self.code(), self.to_string())
    }
}

/// Malformed JSON body or query string
#[derive(Debug)]
pub struct PayloadError {
    pub error: &'static str,
    pub message: String,
}

impl fmt::Display for PayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for PayloadError {}

impl ResponseError for PayloadError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }

    fn error_response(&self) -> HttpResponse {
        error_body(self.status_code(), self.error, self.message.clone())
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    PayloadError {
        error: "invalid_json",
        message: format!("Invalid JSON: {}", err),
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    PayloadError {
        error: "invalid_query",
        message: format!("Invalid query: {}", err),
    }
    .into()
}

/// Handle path parameter errors (e.g. a non-numeric id)
pub fn handle_path_error(err: error::PathError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    PayloadError {
        error: "invalid_path",
        message: format!("Invalid path: {}", err),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::StoreError;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(MatchError::NotFound("x".into()).status_code(), StatusCode::NOT_FOUND);
        assert_eq!(MatchError::Conflict("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(MatchError::NotEligible("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(MatchError::Forbidden("x".into()).status_code(), StatusCode::FORBIDDEN);
        assert_eq!(MatchError::InvalidOperation("x".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(MatchError::RaceLost("x".into()).status_code(), StatusCode::CONFLICT);
        assert_eq!(
            MatchError::Storage(StoreError::InvalidInput("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
