//! HTTP handlers and route configuration.

mod comments;
mod health;
mod posts;
mod users;
mod views;

#[cfg(test)]
mod tests;

use actix_web::error::{JsonPayloadError, UrlencodedError};
use actix_web::{Either, HttpRequest, web};

use crate::middleware::error::AppError;

/// A request body accepted either as JSON or as an urlencoded form.
pub type JsonOrForm<T> = Either<web::Json<T>, web::Form<T>>;

pub(crate) fn body<T>(payload: JsonOrForm<T>) -> T {
    match payload {
        Either::Left(json) => json.into_inner(),
        Either::Right(form) => form.into_inner(),
    }
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

fn form_error(err: UrlencodedError, _req: &HttpRequest) -> actix_web::Error {
    AppError::BadRequest(err.to_string()).into()
}

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            // Unreadable bodies answer with the same problem document as every other error
            .app_data(web::JsonConfig::default().error_handler(json_error))
            .app_data(web::FormConfig::default().error_handler(form_error))
            // Public routes
            .route("/health", web::get().to(health::health_check))
            .service(
                web::scope("/posts")
                    .route("", web::get().to(posts::list_posts))
                    .route("", web::post().to(posts::create_post))
                    // Must stay ahead of "/{id}"
                    .route("/vote", web::put().to(posts::upvote))
                    .route("/{id}", web::get().to(posts::get_post))
                    .route("/{id}", web::put().to(posts::update_post))
                    .route("/{id}", web::delete().to(posts::delete_post)),
            )
            .service(
                web::scope("/users")
                    .route("", web::get().to(users::list_users))
                    .route("", web::post().to(users::create_user))
                    .route("/login", web::post().to(users::login))
                    .route("/logout", web::post().to(users::logout))
                    .route("/{id}", web::get().to(users::get_user))
                    .route("/{id}", web::put().to(users::update_user))
                    .route("/{id}", web::delete().to(users::delete_user)),
            )
            .service(
                web::scope("/comments")
                    .route("", web::get().to(comments::list_comments))
                    .route("", web::post().to(comments::create_comment))
                    .route("/{id}", web::delete().to(comments::delete_comment)),
            ),
    );
}
