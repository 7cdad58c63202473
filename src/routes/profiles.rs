use actix_web::{web, HttpResponse, Responder};
use validator::Validate;

use crate::core::MatchError;
use crate::models::{HealthResponse, ProfileUpdateRequest};
use crate::routes::{auth::CurrentUser, AppState};

/// Configure health and profile routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/me", web::get().to(get_me))
        .route("/me", web::patch().to(update_me))
        .route("/me", web::delete().to(delete_me));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state.store.health_check().await.unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// GET /api/v1/me
async fn get_me(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, MatchError> {
    let me = state.profiles.get_user(user.id).await?;
    Ok(HttpResponse::Ok().json(me))
}

/// PATCH /api/v1/me
///
/// Partial update; omitted fields are kept.
async fn update_me(
    state: web::Data<AppState>,
    user: CurrentUser,
    req: web::Json<ProfileUpdateRequest>,
) -> Result<HttpResponse, MatchError> {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for profile update of {}: {:?}", user.id, errors);
        return Err(MatchError::InvalidOperation(errors.to_string()));
    }

    let updated = state.profiles.update_profile(user.id, req.into_inner()).await?;
    Ok(HttpResponse::Ok().json(updated))
}

/// DELETE /api/v1/me
///
/// Removes the account; every match (with its conversation) and every like
/// involving the caller goes with it.
async fn delete_me(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, MatchError> {
    let outcome = state.matcher.delete_account(user.id).await?;

    tracing::info!(
        "Account {} closed by its owner ({} match(es) dissolved)",
        outcome.user,
        outcome.dissolved.len()
    );

    Ok(HttpResponse::NoContent().finish())
}
