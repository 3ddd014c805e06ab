//! Comment handlers.

use actix_web::{HttpResponse, web};

use postboard_core::domain::NewComment;
use postboard_shared::MutationResponse;
use postboard_shared::dto::CreateCommentRequest;

use super::{JsonOrForm, body};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /api/comments
pub async fn list_comments(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let comments = state.comments.find_all().await?;

    Ok(HttpResponse::Ok().json(comments))
}

/// POST /api/comments
pub async fn create_comment(
    state: web::Data<AppState>,
    identity: Identity,
    payload: JsonOrForm<CreateCommentRequest>,
) -> AppResult<HttpResponse> {
    let req = body(payload);

    let comment = state
        .comments
        .create(NewComment::new(req.comment_text, req.post_id, identity.user_id))
        .await?;

    Ok(HttpResponse::Created().json(comment))
}

/// DELETE /api/comments/{id}
pub async fn delete_comment(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let affected = state
        .comments
        .delete(path.into_inner())
        .await
        .map_err(|e| AppError::or_not_found(e, "No comment found with this id"))?;

    Ok(HttpResponse::Ok().json(MutationResponse::new(affected)))
}
