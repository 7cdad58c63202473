use actix_web::{web, HttpResponse};
use validator::Validate;

use crate::core::MatchError;
use crate::models::{MatchId, PostMessageRequest};
use crate::routes::{auth::CurrentUser, AppState};

/// Configure match and conversation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/matches", web::get().to(list_matches))
        .route("/matches/{match_id}", web::get().to(get_match))
        .route("/matches/{match_id}/messages", web::get().to(get_messages))
        .route("/matches/{match_id}/messages", web::post().to(post_message))
        .route("/matches/{match_id}/messages/last", web::get().to(get_last_message));
}

/// GET /api/v1/matches
///
/// Matches of the caller, newest first, each with the other member's
/// profile and the last message.
async fn list_matches(
    state: web::Data<AppState>,
    user: CurrentUser,
) -> Result<HttpResponse, MatchError> {
    let matches = state.matcher.matches_for(user.id).await?;
    Ok(HttpResponse::Ok().json(matches))
}

/// GET /api/v1/matches/{match_id}
async fn get_match(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<MatchId>,
) -> Result<HttpResponse, MatchError> {
    let summary = state.matcher.get_match(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(summary))
}

/// POST /api/v1/matches/{match_id}/messages
///
/// Request body:
/// ```json
/// { "content": "string" }
/// ```
async fn post_message(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<MatchId>,
    req: web::Json<PostMessageRequest>,
) -> Result<HttpResponse, MatchError> {
    if let Err(errors) = req.validate() {
        return Err(MatchError::InvalidOperation(errors.to_string()));
    }

    let message = state
        .conversations
        .post_message(path.into_inner(), user.id, &req.content)
        .await?;

    Ok(HttpResponse::Created().json(message))
}

/// GET /api/v1/matches/{match_id}/messages
async fn get_messages(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<MatchId>,
) -> Result<HttpResponse, MatchError> {
    let history = state.conversations.history(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(history))
}

/// GET /api/v1/matches/{match_id}/messages/last
///
/// `null` when the conversation is empty.
async fn get_last_message(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<MatchId>,
) -> Result<HttpResponse, MatchError> {
    let last = state.conversations.last_message(user.id, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(last))
}
