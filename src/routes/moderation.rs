use actix_web::{web, HttpResponse};

use crate::models::{ModerationResponse, UserId};
use crate::routes::{auth::CurrentUser, AppState};

/// Configure staff-only moderation routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/users/{user_id}/ban", web::post().to(ban_user))
        .route("/users/{user_id}/unban", web::post().to(unban_user));
}

/// POST /api/v1/users/{user_id}/ban
///
/// Dissolves every match of the user; likes are kept.
async fn ban_user(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<UserId>,
) -> Result<HttpResponse, actix_web::Error> {
    user.require_staff()?;

    let outcome = state.matcher.ban(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ModerationResponse {
        user_id: outcome.user.id,
        is_banned: outcome.user.is_banned,
        dissolved_matches: outcome.dissolved,
    }))
}

/// POST /api/v1/users/{user_id}/unban
async fn unban_user(
    state: web::Data<AppState>,
    user: CurrentUser,
    path: web::Path<UserId>,
) -> Result<HttpResponse, actix_web::Error> {
    user.require_staff()?;

    let unbanned = state.matcher.unban(path.into_inner()).await?;

    Ok(HttpResponse::Ok().json(ModerationResponse {
        user_id: unbanned.id,
        is_banned: unbanned.is_banned,
        dissolved_matches: vec![],
    }))
}
