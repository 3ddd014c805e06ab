//! User handlers: registration, session login/logout and account management.

use actix_web::{HttpResponse, http::header, web};

use postboard_core::domain::{NewUser, PublicUser, Session, UserChanges};
use postboard_shared::MutationResponse;
use postboard_shared::dto::{CreateUserRequest, LoginRequest, UpdateUserRequest};

use super::views::homepage;
use super::{JsonOrForm, body};
use crate::middleware::auth::{Identity, OptionalIdentity, expired_session_cookie, session_cookie};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;

const USER_NOT_FOUND: &str = "No user found with this id";

/// GET /api/users
pub async fn list_users(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let users: Vec<PublicUser> = state
        .users
        .find_all()
        .await?
        .into_iter()
        .map(PublicUser::from)
        .collect();

    Ok(HttpResponse::Ok().json(users))
}

/// GET /api/users/{id}
pub async fn get_user(state: web::Data<AppState>, path: web::Path<i32>) -> AppResult<HttpResponse> {
    let profile = state
        .users
        .find_profile(path.into_inner())
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(HttpResponse::Ok().json(profile))
}

/// POST /api/users - registers the account and sends the browser to the login page.
pub async fn create_user(
    state: web::Data<AppState>,
    payload: JsonOrForm<CreateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = body(payload);

    let password_hash = state.passwords.hash(&req.password)?;
    let user = state
        .users
        .create(NewUser::new(req.username, req.email, password_hash))
        .await?;
    tracing::info!(user_id = user.id, "User registered");

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, "/login"))
        .finish())
}

/// POST /api/users/login
pub async fn login(
    state: web::Data<AppState>,
    payload: JsonOrForm<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body(payload);

    let user = state
        .users
        .find_by_email(&req.email)
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !state.passwords.verify(&req.password, &user.password_hash)? {
        tracing::debug!(user_id = user.id, "Rejected login with wrong password");
        return Err(AppError::Unauthorized);
    }

    let session = state
        .sessions
        .create(Session::new(
            user.id,
            user.username.clone(),
            state.session_config.ttl,
        ))
        .await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(HttpResponse::Ok()
        .cookie(session_cookie(&state.session_config, &session))
        .content_type("text/html; charset=utf-8")
        .body(homepage(user.id, &user.username)))
}

/// POST /api/users/logout
pub async fn logout(
    state: web::Data<AppState>,
    identity: OptionalIdentity,
) -> AppResult<HttpResponse> {
    if let OptionalIdentity(Some(identity)) = identity {
        state.sessions.destroy(&identity.token).await?;
        tracing::info!(user_id = identity.user_id, "User logged out");
    }

    Ok(HttpResponse::Found()
        .cookie(expired_session_cookie(&state.session_config))
        .insert_header((header::LOCATION, "/"))
        .finish())
}

/// PUT /api/users/{id}
pub async fn update_user(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<i32>,
    payload: web::Json<UpdateUserRequest>,
) -> AppResult<HttpResponse> {
    let req = payload.into_inner();

    let password_hash = match req.password {
        Some(password) => Some(state.passwords.hash(&password)?),
        None => None,
    };
    let changes = UserChanges {
        username: req.username,
        email: req.email,
        password_hash,
    };

    let affected = state
        .users
        .update(path.into_inner(), changes)
        .await
        .map_err(|e| AppError::or_not_found(e, USER_NOT_FOUND))?;

    Ok(HttpResponse::Ok().json(MutationResponse::new(affected)))
}

/// DELETE /api/users/{id}
pub async fn delete_user(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i32>,
) -> AppResult<HttpResponse> {
    let id = path.into_inner();
    let affected = state
        .users
        .delete(id)
        .await
        .map_err(|e| AppError::or_not_found(e, USER_NOT_FOUND))?;
    let sessions = state.sessions.destroy_for_user(id).await?;
    tracing::info!(
        user_id = id,
        deleted_by = identity.user_id,
        sessions,
        "User deleted"
    );

    Ok(HttpResponse::Ok().json(MutationResponse::new(affected)))
}
