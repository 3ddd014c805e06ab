//! Post handlers: listing, reads, writes and voting.

use actix_web::{HttpResponse, http::header, web};

use postboard_core::domain::NewPost;
use postboard_shared::MutationResponse;
use postboard_shared::dto::{CreatePostRequest, UpdatePostRequest, VoteRequest};

use super::{JsonOrForm, body};
use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const POST_NOT_FOUND: &str = "No post found with this id";

/// GET /api/posts
pub async fn list_posts(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let posts = state.posts.find_all_detailed().await?;

    Ok(HttpResponse::Ok().json(posts))
}

/// GET /api/posts/{id}
pub async fn get_post(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .find_detailed(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(POST_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(post))
}

/// POST /api/posts - redirects to the homepage once the post is stored.
pub async fn create_post(
    state: web::Data<AppState>,
    identity: Identity,
    payload: JsonOrForm<CreatePostRequest>,
) -> AppResult<HttpResponse> {
    let req = body(payload);

    let post = state
        .posts
        .create(NewPost::new(identity.user_id, req.post_text))
        .await?;
    tracing::info!(post_id = post.id, user_id = identity.user_id, "Post created");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/"))
        .finish())
}

/// PUT /api/posts/vote
pub async fn upvote(
    state: web::Data<AppState>,
    identity: Identity,
    payload: web::Json<VoteRequest>,
) -> AppResult<HttpResponse> {
    let post = state
        .posts
        .upvote(identity.user_id, payload.post_id)
        .await
        .map_err(|e| AppError::or_not_found(e, POST_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(post))
}

/// PUT /api/posts/{id}
pub async fn update_post(
    state: web::Data<AppState>,
    path: web::Path<i32>,
    payload: web::Json<UpdatePostRequest>,
) -> AppResult<HttpResponse> {
    let affected = state
        .posts
        .update_text(path.into_inner(), payload.into_inner().post_text)
        .await
        .map_err(|e| AppError::or_not_found(e, POST_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(MutationResponse::new(affected)))
}

/// DELETE /api/posts/{id}
pub async fn delete_post(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let affected = state
        .posts
        .delete(id)
        .await
        .map_err(|e| AppError::or_not_found(e, POST_NOT_FOUND))?;
    tracing::info!(post_id = id, user_id = identity.user_id, "Post deleted");

    Ok(HttpResponse::Ok().json(MutationResponse::new(affected)))
}
