use actix_web::cookie::Cookie;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::TimeDelta;
use serde_json::{Value, json};

use postboard_core::domain::{NewPost, NewUser, Session};

use super::configure_routes;
use crate::config::SessionConfig;
use crate::state::AppState;

fn in_memory_state() -> web::Data<AppState> {
    web::Data::new(AppState::in_memory(SessionConfig::default()))
}

/// Register a user straight through the store and open a session for them.
async fn seed_session(state: &AppState, username: &str) -> (i32, Cookie<'static>) {
    let user = state
        .users
        .create(NewUser::new(
            username.to_string(),
            format!("{username}@example.com"),
            "not-a-real-hash".to_string(),
        ))
        .await
        .unwrap();
    let session = state
        .sessions
        .create(Session::new(
            user.id,
            user.username.clone(),
            TimeDelta::hours(1),
        ))
        .await
        .unwrap();

    (user.id, Cookie::new("postboard.sid", session.token))
}

async fn seed_post(state: &AppState, user_id: i32, text: &str) -> i32 {
    state
        .posts
        .create(NewPost::new(user_id, text.to_string()))
        .await
        .unwrap()
        .id
}

#[actix_web::test]
async fn test_missing_post_returns_fixed_message() {
    let state = in_memory_state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/posts/404").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "No post found with this id");
    assert_eq!(body["status"], 404);
}

#[actix_web::test]
async fn test_posts_are_listed_newest_first() {
    let state = in_memory_state();
    let (user_id, _) = seed_session(&state, "ada").await;
    for text in ["one", "two", "three"] {
        seed_post(&state, user_id, text).await;
    }
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/posts").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    let texts: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["post_text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["three", "two", "one"]);
    assert_eq!(body[0]["user"]["username"], "ada");
    assert_eq!(body[0]["vote_count"], 0);
}

#[actix_web::test]
async fn test_vote_is_counted_once_per_user() {
    let state = in_memory_state();
    let (ada, ada_cookie) = seed_session(&state, "ada").await;
    let (_, bob_cookie) = seed_session(&state, "bob").await;
    let post_id = seed_post(&state, ada, "vote for me").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let mut counts = Vec::new();
    for cookie in [&ada_cookie, &ada_cookie, &bob_cookie] {
        let req = test::TestRequest::put()
            .uri("/api/posts/vote")
            .cookie(cookie.clone())
            .set_json(json!({ "post_id": post_id }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = test::read_body_json(resp).await;
        counts.push(body["vote_count"].as_i64().unwrap());
    }

    assert_eq!(counts, vec![1, 1, 2]);
}

#[actix_web::test]
async fn test_vote_on_missing_post_is_not_found() {
    let state = in_memory_state();
    let (_, cookie) = seed_session(&state, "ada").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::put()
        .uri("/api/posts/vote")
        .cookie(cookie)
        .set_json(json!({ "post_id": 77 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_register_login_then_post() {
    let state = in_memory_state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_form([
            ("username", "lernantino"),
            ("email", "lernantino@example.com"),
            ("password", "password1234"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/login");

    let req = test::TestRequest::post()
        .uri("/api/users/login")
        .set_json(json!({ "email": "lernantino@example.com", "password": "password1234" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == "postboard.sid")
        .map(|c| c.into_owned())
        .unwrap();

    let user = state
        .users
        .find_by_email("lernantino@example.com")
        .await
        .unwrap()
        .unwrap();
    let session = state.sessions.find(cookie.value()).await.unwrap().unwrap();
    assert_eq!(session.user_id, user.id);

    let page = test::read_body(resp).await;
    let page = String::from_utf8(page.to_vec()).unwrap();
    assert!(page.contains(&format!(r#"data-user-id="{}""#, user.id)));

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(cookie)
        .set_form([("post_text", "hello from a form")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");

    let posts = state.posts.find_all_detailed().await.unwrap();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].user.id, user.id);
}

#[actix_web::test]
async fn test_login_with_wrong_password_is_unauthorized() {
    let state = in_memory_state();
    let hash = state.passwords.hash("right-password").unwrap();
    state
        .users
        .create(NewUser::new(
            "ada".to_string(),
            "ada@example.com".to_string(),
            hash,
        ))
        .await
        .unwrap();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    for (email, password) in [
        ("ada@example.com", "wrong-password"),
        ("nobody@example.com", "right-password"),
    ] {
        let req = test::TestRequest::post()
            .uri("/api/users/login")
            .set_json(json!({ "email": email, "password": password }))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_duplicate_registration_conflicts() {
    let state = in_memory_state();
    seed_session(&state, "ada").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .set_json(json!({
            "username": "ada",
            "email": "another@example.com",
            "password": "password1234"
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_update_missing_post_is_not_found() {
    let state = in_memory_state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::put()
        .uri("/api/posts/999")
        .set_json(json!({ "post_text": "edited" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["detail"], "No post found with this id");
}

#[actix_web::test]
async fn test_malformed_json_body_is_a_problem_document() {
    let state = in_memory_state();
    let (user_id, _) = seed_session(&state, "ada").await;
    let post_id = seed_post(&state, user_id, "draft").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{post_id}"))
        .insert_header((header::CONTENT_TYPE, "application/json"))
        .set_payload(r#"{"post_text": "#)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["title"], "Bad Request");
    assert!(body["detail"].is_string());
}

#[actix_web::test]
async fn test_incomplete_registration_form_is_a_problem_document() {
    let state = in_memory_state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/users")
        .insert_header((header::CONTENT_TYPE, "application/x-www-form-urlencoded"))
        .set_payload("username=ada")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], 400);
    assert_eq!(body["title"], "Bad Request");
}

#[actix_web::test]
async fn test_update_post_reports_affected_rows() {
    let state = in_memory_state();
    let (user_id, _) = seed_session(&state, "ada").await;
    let post_id = seed_post(&state, user_id, "draft").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/posts/{post_id}"))
        .set_json(json!({ "post_text": "final" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body, json!({ "affected_rows": 1 }));
    let post = state.posts.find_detailed(post_id).await.unwrap().unwrap();
    assert_eq!(post.post_text, "final");
}

#[actix_web::test]
async fn test_user_list_never_contains_password() {
    let state = in_memory_state();
    seed_session(&state, "ada").await;
    seed_session(&state, "grace").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/users").to_request();
    let resp = test::call_service(&app, req).await;
    let raw = test::read_body(resp).await;
    let text = String::from_utf8(raw.to_vec()).unwrap();

    assert!(text.contains("grace"));
    assert!(!text.contains("password"));
    assert!(!text.contains("not-a-real-hash"));
}

#[actix_web::test]
async fn test_user_profile_includes_activity() {
    let state = in_memory_state();
    let (ada, _) = seed_session(&state, "ada").await;
    let (_, bob_cookie) = seed_session(&state, "bob").await;
    let post_id = seed_post(&state, ada, "ada's post").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(bob_cookie.clone())
        .set_json(json!({ "comment_text": "nice", "post_id": post_id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::CREATED);

    let req = test::TestRequest::put()
        .uri("/api/posts/vote")
        .cookie(bob_cookie)
        .set_json(json!({ "post_id": post_id }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/users/2").to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["username"], "bob");
    assert_eq!(profile["comments"][0]["comment_text"], "nice");
    assert_eq!(profile["voted_posts"][0]["post_text"], "ada's post");
    assert!(profile.get("password_hash").is_none());

    let req = test::TestRequest::get()
        .uri(&format!("/api/posts/{post_id}"))
        .to_request();
    let post: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(post["comments"][0]["user_id"], 2);
    assert_eq!(post["vote_count"], 1);

    let req = test::TestRequest::get().uri("/api/users/99").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_comment_on_missing_post_conflicts() {
    let state = in_memory_state();
    let (_, cookie) = seed_session(&state, "ada").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/comments")
        .cookie(cookie)
        .set_json(json!({ "comment_text": "hello?", "post_id": 12 }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::CONFLICT);
}

#[actix_web::test]
async fn test_guarded_routes_require_session() {
    let state = in_memory_state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let requests = [
        test::TestRequest::post()
            .uri("/api/posts")
            .set_json(json!({ "post_text": "hi" })),
        test::TestRequest::put()
            .uri("/api/posts/vote")
            .set_json(json!({ "post_id": 1 })),
        test::TestRequest::delete().uri("/api/posts/1"),
        test::TestRequest::put()
            .uri("/api/users/1")
            .set_json(json!({ "username": "x" })),
        test::TestRequest::delete().uri("/api/users/1"),
        test::TestRequest::post()
            .uri("/api/comments")
            .set_json(json!({ "comment_text": "hi", "post_id": 1 })),
        test::TestRequest::delete().uri("/api/comments/1"),
    ];

    for req in requests {
        let resp = test::call_service(&app, req.to_request()).await;
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }
}

#[actix_web::test]
async fn test_unknown_session_is_rejected() {
    let state = in_memory_state();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::delete()
        .uri("/api/posts/1")
        .cookie(Cookie::new("postboard.sid", "forged"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_logout_destroys_session() {
    let state = in_memory_state();
    let (_, cookie) = seed_session(&state, "ada").await;
    let token = cookie.value().to_string();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::post()
        .uri("/api/users/logout")
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/");
    assert!(state.sessions.find(&token).await.unwrap().is_none());
}

#[actix_web::test]
async fn test_deleted_user_session_stops_working() {
    let state = in_memory_state();
    let (user_id, cookie) = seed_session(&state, "ada").await;
    let token = cookie.value().to_string();
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/users/{user_id}"))
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "affected_rows": 1 }));
    assert!(state.sessions.find(&token).await.unwrap().is_none());

    let req = test::TestRequest::post()
        .uri("/api/posts")
        .cookie(cookie)
        .set_json(json!({ "post_text": "from beyond" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(state.posts.find_all_detailed().await.unwrap().is_empty());
}

#[actix_web::test]
async fn test_delete_post_then_missing() {
    let state = in_memory_state();
    let (user_id, cookie) = seed_session(&state, "ada").await;
    let post_id = seed_post(&state, user_id, "short lived").await;
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(configure_routes)).await;

    let uri = format!("/api/posts/{post_id}");
    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(cookie.clone())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["affected_rows"], 1);

    let req = test::TestRequest::delete()
        .uri(&uri)
        .cookie(cookie)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_health() {
    let app = test::init_service(App::new().configure(configure_routes)).await;

    let req = test::TestRequest::get().uri("/api/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "ok");
}
