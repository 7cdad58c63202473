use actix_web::dev::Payload;
use actix_web::http::StatusCode;
use actix_web::{web, FromRequest, HttpRequest, HttpResponse, ResponseError};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::future::{ready, Ready};
use thiserror::Error;

use crate::models::{ErrorResponse, UserId};
use crate::routes::AppState;

/// Claims carried by the bearer token issued by the auth service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a decimal string
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub staff: bool,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("missing authorization header")]
    MissingHeader,

    #[error("authorization header must use Bearer scheme")]
    Malformed,

    #[error("token has expired")]
    Expired,

    #[error("invalid token: {0}")]
    Invalid(String),

    #[error("staff privileges required")]
    StaffOnly,
}

impl ResponseError for AuthError {
    fn status_code(&self) -> StatusCode {
        match self {
            AuthError::StaffOnly => StatusCode::FORBIDDEN,
            _ => StatusCode::UNAUTHORIZED,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        HttpResponse::build(status).json(ErrorResponse {
            error: "unauthorized".to_string(),
            message: self.to_string(),
            status_code: status.as_u16(),
        })
    }
}

/// Identity of the caller, passed explicitly into every core operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: UserId,
    pub is_staff: bool,
}

impl CurrentUser {
    pub fn require_staff(&self) -> Result<(), AuthError> {
        if self.is_staff {
            Ok(())
        } else {
            Err(AuthError::StaffOnly)
        }
    }
}

fn bearer_token(req: &HttpRequest) -> Result<&str, AuthError> {
    let header = req
        .headers()
        .get("Authorization")
        .ok_or(AuthError::MissingHeader)?
        .to_str()
        .map_err(|_| AuthError::Malformed)?;

    header.strip_prefix("Bearer ").ok_or(AuthError::Malformed)
}

/// Validate an HS256 token and extract the caller
pub fn verify_token(token: &str, secret: &str) -> Result<CurrentUser, AuthError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
            _ => AuthError::Invalid(e.to_string()),
        })?;

    let id = data
        .claims
        .sub
        .parse::<UserId>()
        .map_err(|_| AuthError::Invalid(format!("subject '{}' is not a user id", data.claims.sub)))?;

    Ok(CurrentUser {
        id,
        is_staff: data.claims.staff,
    })
}

fn authenticate(req: &HttpRequest) -> Result<CurrentUser, AuthError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AuthError::Invalid("authentication is not configured".to_string()))?;

    let token = bearer_token(req)?;
    verify_token(token, &state.jwt_secret)
}

impl FromRequest for CurrentUser {
    type Error = AuthError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let result = authenticate(req);
        if let Err(e) = &result {
            tracing::debug!("Rejected request to {}: {}", req.path(), e);
        }
        ready(result)
    }
}
