//! Session authentication extractors.
//!
//! Guarded handlers take an [`Identity`] argument; the request is rejected
//! with 401 before the handler runs when there is no live session.

use actix_web::cookie::{Cookie, SameSite, time::Duration as CookieDuration};
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::StatusCode, web};
use chrono::Utc;
use futures::future::LocalBoxFuture;

use postboard_core::domain::Session;
use postboard_core::ports::AuthError;
use postboard_shared::ErrorResponse;

use crate::config::SessionConfig;
use crate::state::AppState;

/// Authenticated user identity extractor.
///
/// ```ignore
/// async fn protected_route(identity: Identity) -> impl Responder {
///     format!("Hello, user {}!", identity.user_id)
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: i32,
    pub username: String,
    pub token: String,
}

impl From<Session> for Identity {
    fn from(session: Session) -> Self {
        Self {
            user_id: session.user_id,
            username: session.username,
            token: session.token,
        }
    }
}

/// Error type for authentication failures.
#[derive(Debug)]
pub struct AuthenticationError(pub AuthError);

impl std::fmt::Display for AuthenticationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::ResponseError for AuthenticationError {
    fn status_code(&self) -> StatusCode {
        match &self.0 {
            AuthError::MissingSession
            | AuthError::SessionExpired
            | AuthError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        let error = match &self.0 {
            AuthError::MissingSession => ErrorResponse::new(401, "Authentication Required")
                .with_detail("Please log in to continue."),
            AuthError::SessionExpired => ErrorResponse::new(401, "Session Expired")
                .with_detail("Your session has expired. Please log in again."),
            AuthError::InvalidCredentials => ErrorResponse::unauthorized(),
            other => {
                tracing::error!("Session lookup failed: {}", other);
                ErrorResponse::internal_error(other.to_string())
            }
        };

        actix_web::HttpResponse::build(self.status_code()).json(error)
    }
}

impl FromRequest for Identity {
    type Error = AuthenticationError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let state = match req.app_data::<web::Data<AppState>>() {
            Some(state) => state.clone(),
            None => {
                tracing::error!("AppState not found in app data");
                return Box::pin(async {
                    Err(AuthenticationError(AuthError::Store(
                        "Server configuration error".to_string(),
                    )))
                });
            }
        };

        let token = req
            .cookie(&state.session_config.cookie_name)
            .map(|c| c.value().to_string());

        Box::pin(async move {
            let token = token.ok_or(AuthenticationError(AuthError::MissingSession))?;

            match state.sessions.find(&token).await {
                Ok(Some(session)) => Ok(Identity::from(session)),
                Ok(None) => Err(AuthenticationError(AuthError::SessionExpired)),
                Err(e) => Err(AuthenticationError(e)),
            }
        })
    }
}

/// Optional identity extractor - doesn't fail if not authenticated.
pub struct OptionalIdentity(pub Option<Identity>);

impl FromRequest for OptionalIdentity {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let identity = Identity::from_request(req, payload);

        Box::pin(async move { Ok(OptionalIdentity(identity.await.ok())) })
    }
}

/// Build the cookie carrying a session. The cookie expires together with
/// the server-side record.
pub fn session_cookie(config: &SessionConfig, session: &Session) -> Cookie<'static> {
    let remaining = (session.expires_at - Utc::now()).num_seconds().max(0);

    Cookie::build(config.cookie_name.clone(), session.token.clone())
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .max_age(CookieDuration::seconds(remaining))
        .finish()
}

/// Build a cookie that tells the browser to drop the session.
pub fn expired_session_cookie(config: &SessionConfig) -> Cookie<'static> {
    let mut cookie = Cookie::build(config.cookie_name.clone(), "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(config.secure)
        .finish();
    cookie.make_removal();
    cookie
}
