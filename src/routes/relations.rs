use actix_web::{web, HttpResponse};

use crate::core::MatchError;
use crate::models::{CandidatesResponse, LikeResponse, ProfileSummary, UserId};
use crate::routes::{auth::CurrentUser, AppState};

/// Configure candidate and like routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/candidates", web::get().to(list_candidates))
        .route("/likes", web::get().to(list_likes))
        .route("/likes/{target_id}", web::post().to(create_like))
        .route("/likes/{target_id}", web::delete().to(revoke_like));
}

/// GET /api/v1/candidates
///
/// Profiles the caller may like right now.
async fn list_candidates(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, MatchError> {
    let candidates = state.matcher.candidates(user.id).await?;

    let summaries: Vec<ProfileSummary> = candidates.iter().map(ProfileSummary::from).collect();

    tracing::info!("Returning {} candidates for user {}", summaries.len(), user.id);

    Ok(HttpResponse::Ok().json(CandidatesResponse {
        total_results: summaries.len(),
        candidates: summaries,
    }))
}

/// GET /api/v1/likes
async fn list_likes(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, MatchError> {
    let likes = state.matcher.list_likes_of(user.id).await?;
    Ok(HttpResponse::Ok().json(likes))
}

/// POST /api/v1/likes/{target_id}
///
/// 201 on creation, 409 if already liked, 403 if not eligible, 404 if the
/// target does not exist.
async fn create_like(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<UserId>,
) -> Result<HttpResponse, MatchError> {
    let target = path.into_inner();
    let outcome = state.matcher.create_like(user.id, target).await?;

    Ok(HttpResponse::Created().json(LikeResponse {
        like: outcome.like,
        matched: outcome.matched,
        match_created: outcome.match_created,
    }))
}

/// DELETE /api/v1/likes/{target_id}
///
/// Always 204, whether or not the like existed.
async fn revoke_like(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<UserId>,
) -> Result<HttpResponse, MatchError> {
    let target = path.into_inner();
    let outcome = state.matcher.revoke_like(user.id, target).await?;

    tracing::debug!(
        "Revoke {} -> {}: like removed {}, match dissolved {:?}",
        user.id,
        target,
        outcome.like_removed,
        outcome.dissolved
    );

    Ok(HttpResponse::NoContent().finish())
}
