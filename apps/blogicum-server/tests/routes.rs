use std::sync::Arc;

use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::{App, test, web};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::{Value, json};
use tracing_actix_web::TracingLogger;
use uuid::Uuid;

use blogicum_core::domain::{Category, Comment, Post, PostDraft, User};
use blogicum_core::ports::{BaseRepository, CommentRepository, FixedClock};
use blogicum_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};
use blogicum_server::config::PaginationConfig;
use blogicum_server::state::{AppState, Services};
use blogicum_server::{handlers, pages};

const PASSWORD: &str = "correct-horse";

fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339("2024-03-10T09:30:00Z")
        .unwrap()
        .with_timezone(&Utc)
}

struct Harness {
    store: InMemoryStore,
    state: AppState,
}

fn harness() -> Harness {
    let store = InMemoryStore::new();
    let services = Services {
        tokens: Arc::new(JwtTokenService::new(JwtConfig::default())),
        passwords: Arc::new(Argon2PasswordService::with_params(8, 1, 1).unwrap()),
        clock: Arc::new(FixedClock(now())),
        pagination: PaginationConfig::default(),
    };
    let state = AppState::in_memory(&store, services);

    Harness { store, state }
}

macro_rules! init_app {
    ($harness:expr) => {
        test::init_service(
            App::new()
                .wrap(pages::error_handlers())
                .wrap(TracingLogger::default())
                .app_data(web::Data::new($harness.state.clone()))
                .configure(handlers::configure_routes),
        )
        .await
    };
}

impl Harness {
    /// Store a user and return it with a bearer header value.
    async fn user(&self, username: &str) -> (User, String) {
        let hash = self.state.passwords.hash(PASSWORD).unwrap();
        let user = User::new(
            username.to_string(),
            format!("{username}@example.com"),
            hash,
            now(),
        );
        let user = self.store.users().insert(user).await.unwrap();
        let token = self.state.tokens.generate_token(user.id).unwrap();

        (user, format!("Bearer {token}"))
    }

    async fn category(&self, slug: &str, is_published: bool) -> Category {
        let mut category = Category::new(slug.to_uppercase(), String::new(), slug.to_string(), now());
        category.is_published = is_published;
        self.store.categories().insert(category).await.unwrap()
    }

    async fn post(&self, author: &User, draft: PostDraft) -> Post {
        self.store
            .posts()
            .insert(Post::new(author.id, draft, now()))
            .await
            .unwrap()
    }
}

fn draft(title: &str) -> PostDraft {
    PostDraft {
        title: title.to_string(),
        text: "Text".to_string(),
        pub_date: now() - TimeDelta::hours(1),
        category_id: None,
        location_id: None,
        is_published: true,
    }
}

fn location<B>(res: &ServiceResponse<B>) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
}

fn titles(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

#[actix_rt::test]
async fn test_unpublished_post_hidden_from_index_but_visible_to_author() {
    let h = harness();
    let (leo, leo_auth) = h.user("leo").await;
    let (_, mia_auth) = h.user("mia").await;
    let mut hidden = draft("Draft");
    hidden.is_published = false;
    let post = h.post(&leo, hidden).await;
    let app = init_app!(h);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let index: Value = test::read_body_json(res).await;
    assert_eq!(index["total_items"], 0);

    let uri = format!("/posts/{}/", post.id);
    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, mia_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((header::AUTHORIZATION, leo_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let detail: Value = test::read_body_json(res).await;
    assert_eq!(detail["post"]["title"], "Draft");
    assert_eq!(detail["can_edit"], true);
}

#[actix_rt::test]
async fn test_future_post_excluded_from_index_and_category() {
    let h = harness();
    let (leo, _) = h.user("leo").await;
    let travel = h.category("travel", true).await;

    let mut current = draft("Now");
    current.pub_date = now();
    current.category_id = Some(travel.id);
    h.post(&leo, current).await;

    let mut scheduled = draft("Later");
    scheduled.pub_date = now() + TimeDelta::seconds(1);
    scheduled.category_id = Some(travel.id);
    let scheduled = h.post(&leo, scheduled).await;
    let app = init_app!(h);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let index: Value = test::read_body_json(res).await;
    assert_eq!(titles(&index), vec!["Now"]);

    let req = test::TestRequest::get().uri("/category/travel/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let listing: Value = test::read_body_json(res).await;
    assert_eq!(listing["category"]["slug"], "travel");
    assert_eq!(titles(&listing["posts"]), vec!["Now"]);
    assert_eq!(listing["posts"]["per_page"], 5);

    let uri = format!("/posts/{}/", scheduled.id);
    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_unpublished_category_hides_page_and_posts() {
    let h = harness();
    let (leo, _) = h.user("leo").await;
    let archive = h.category("archive", false).await;
    let mut filed = draft("Filed");
    filed.category_id = Some(archive.id);
    h.post(&leo, filed).await;
    h.post(&leo, draft("Loose")).await;
    let app = init_app!(h);

    let req = test::TestRequest::get().uri("/category/archive/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let index: Value = test::read_body_json(res).await;
    assert_eq!(titles(&index), vec!["Loose"]);
}

#[actix_rt::test]
async fn test_comment_mutations_are_limited_to_their_author() {
    let h = harness();
    let (leo, leo_auth) = h.user("leo").await;
    let (mia, mia_auth) = h.user("mia").await;
    let post = h.post(&leo, draft("Hello")).await;
    let comment = h
        .store
        .comments()
        .insert(Comment::new(post.id, mia.id, "Nice".to_string(), now()))
        .await
        .unwrap();
    let app = init_app!(h);
    let post_url = format!("/posts/{}/", post.id);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", post.id, comment.id))
        .insert_header((header::AUTHORIZATION, leo_auth.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), post_url);
    assert!(h.store.comments().find_by_id(comment.id).await.unwrap().is_some());

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{}/", post.id, comment.id))
        .insert_header((header::AUTHORIZATION, leo_auth))
        .set_json(json!({ "text": "Hijacked" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/edit_comment/{}/", post.id, comment.id))
        .insert_header((header::AUTHORIZATION, mia_auth.clone()))
        .set_json(json!({ "text": "Very nice" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), post_url);

    let res = test::call_service(&app, test::TestRequest::get().uri(&post_url).to_request()).await;
    let detail: Value = test::read_body_json(res).await;
    assert_eq!(detail["comments"][0]["text"], "Very nice");
    assert_eq!(detail["comments"][0]["author"]["username"], "mia");
    assert_eq!(detail["post"]["comment_count"], 1);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", post.id, comment.id))
        .insert_header((header::AUTHORIZATION, mia_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert!(h.store.comments().find_by_id(comment.id).await.unwrap().is_none());
}

#[actix_rt::test]
async fn test_comment_on_other_post_path_is_not_found() {
    let h = harness();
    let (leo, _) = h.user("leo").await;
    let (mia, mia_auth) = h.user("mia").await;
    let first = h.post(&leo, draft("First")).await;
    let second = h.post(&leo, draft("Second")).await;
    let comment = h
        .store
        .comments()
        .insert(Comment::new(first.id, mia.id, "Hi".to_string(), now()))
        .await
        .unwrap();
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/delete_comment/{}/", second.id, comment.id))
        .insert_header((header::AUTHORIZATION, mia_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_add_comment_requires_existing_post_and_text() {
    let h = harness();
    let (leo, _) = h.user("leo").await;
    let (_, mia_auth) = h.user("mia").await;
    let post = h.post(&leo, draft("Hello")).await;
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", Uuid::new_v4()))
        .insert_header((header::AUTHORIZATION, mia_auth.clone()))
        .set_json(json!({ "text": "Hi" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header((header::AUTHORIZATION, mia_auth.clone()))
        .set_json(json!({ "text": "" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri(&format!("/posts/{}/comment/", post.id))
        .insert_header((header::AUTHORIZATION, mia_auth))
        .set_json(json!({ "text": "Hi" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), format!("/posts/{}/", post.id));
    assert_eq!(h.store.comments().find_by_post(post.id).await.unwrap().len(), 1);
}

#[actix_rt::test]
async fn test_deleting_category_keeps_its_posts() {
    let h = harness();
    let (leo, _) = h.user("leo").await;
    let travel = h.category("travel", true).await;
    let mut filed = draft("Trip");
    filed.category_id = Some(travel.id);
    let post = h.post(&leo, filed).await;

    h.store.categories().delete(travel.id).await.unwrap();
    let app = init_app!(h);

    let uri = format!("/posts/{}/", post.id);
    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let detail: Value = test::read_body_json(res).await;
    assert!(detail["post"]["category"].is_null());

    let req = test::TestRequest::get().uri("/category/travel/").to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_index_pagination_clamps_page_numbers() {
    let h = harness();
    let (leo, _) = h.user("leo").await;
    for minutes in 0..23 {
        let mut post = draft(&format!("Post {minutes}"));
        post.pub_date = now() - TimeDelta::minutes(minutes);
        h.post(&leo, post).await;
    }
    let app = init_app!(h);

    let cases = [
        ("/", 1, 10),
        ("/?page=2", 2, 10),
        ("/?page=3", 3, 3),
        ("/?page=4", 3, 3),
        ("/?page=0", 3, 3),
        ("/?page=abc", 1, 10),
    ];
    for (uri, number, len) in cases {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::OK, "{uri}");
        let page: Value = test::read_body_json(res).await;
        assert_eq!(page["page"], number, "{uri}");
        assert_eq!(page["items"].as_array().unwrap().len(), len, "{uri}");
        assert_eq!(page["total_pages"], 3, "{uri}");
    }

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let first: Value = test::read_body_json(res).await;
    assert_eq!(first["items"][0]["title"], "Post 0");
    assert_eq!(first["has_next"], true);
    assert_eq!(first["has_previous"], false);
}

#[actix_rt::test]
async fn test_create_edit_and_delete_post() {
    let h = harness();
    let (_, leo_auth) = h.user("leo").await;
    let (_, mia_auth) = h.user("mia").await;
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, leo_auth.clone()))
        .set_json(json!({ "title": "Hello", "text": "World" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/profile/leo/");

    let res = test::call_service(&app, test::TestRequest::get().uri("/").to_request()).await;
    let index: Value = test::read_body_json(res).await;
    assert_eq!(titles(&index), vec!["Hello"]);
    let post_id = index["items"][0]["id"].as_str().unwrap().to_string();
    assert_eq!(index["items"][0]["pub_date"], json!(now()));

    let edit_uri = format!("/posts/{post_id}/edit/");
    let req = test::TestRequest::post()
        .uri(&edit_uri)
        .insert_header((header::AUTHORIZATION, mia_auth.clone()))
        .set_json(json!({ "title": "Mine now", "text": "World" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);
    assert_eq!(location(&res), format!("/posts/{post_id}/"));

    let req = test::TestRequest::post()
        .uri(&edit_uri)
        .insert_header((header::AUTHORIZATION, leo_auth.clone()))
        .set_json(json!({ "title": "Hello again", "text": "World" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let uri = format!("/posts/{post_id}/");
    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    let detail: Value = test::read_body_json(res).await;
    assert_eq!(detail["post"]["title"], "Hello again");
    assert_eq!(detail["can_edit"], false);

    let delete_uri = format!("/posts/{post_id}/delete/");
    let req = test::TestRequest::post()
        .uri(&delete_uri)
        .insert_header((header::AUTHORIZATION, mia_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::FOUND);

    let req = test::TestRequest::post()
        .uri(&delete_uri)
        .insert_header((header::AUTHORIZATION, leo_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/profile/leo/");

    let res = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_post_form_validation_and_authentication() {
    let h = harness();
    let (_, leo_auth) = h.user("leo").await;
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .set_json(json!({ "title": "Hello", "text": "World" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 401);

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, leo_auth.clone()))
        .set_json(json!({ "title": "", "text": "World" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], 422);
    assert!(body["errors"][0].as_str().unwrap().starts_with("title: "));

    let req = test::TestRequest::post()
        .uri("/posts/create/")
        .insert_header((header::AUTHORIZATION, leo_auth))
        .set_json(json!({ "title": "Hello", "text": "World", "category_id": Uuid::new_v4() }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errors"][0], "category_id: unknown category");
}

#[actix_rt::test]
async fn test_profile_shows_all_posts_to_owner_only() {
    let h = harness();
    let (leo, leo_auth) = h.user("leo").await;
    h.post(&leo, draft("Public")).await;
    let mut hidden = draft("Private");
    hidden.is_published = false;
    h.post(&leo, hidden).await;
    let app = init_app!(h);

    let res = test::call_service(&app, test::TestRequest::get().uri("/profile/leo/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let profile: Value = test::read_body_json(res).await;
    assert_eq!(profile["is_owner"], false);
    assert!(profile.get("edit_profile_url").is_none());
    assert_eq!(profile["posts"]["total_items"], 1);

    let req = test::TestRequest::get()
        .uri("/profile/leo/")
        .insert_header((header::AUTHORIZATION, leo_auth))
        .to_request();
    let res = test::call_service(&app, req).await;
    let profile: Value = test::read_body_json(res).await;
    assert_eq!(profile["is_owner"], true);
    assert_eq!(profile["edit_profile_url"], "/edit_profile/");
    assert_eq!(profile["password_change_url"], "/auth/password_change/");
    assert_eq!(profile["posts"]["total_items"], 2);

    let res = test::call_service(&app, test::TestRequest::get().uri("/profile/nobody/").to_request()).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[actix_rt::test]
async fn test_edit_profile() {
    let h = harness();
    h.user("mia").await;
    let (_, leo_auth) = h.user("leo").await;
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri("/edit_profile/")
        .insert_header((header::AUTHORIZATION, leo_auth.clone()))
        .set_json(json!({
            "first_name": "Leo",
            "last_name": "Tolstoy",
            "username": "mia",
            "email": "leo@example.com"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/edit_profile/")
        .insert_header((header::AUTHORIZATION, leo_auth))
        .set_json(json!({
            "first_name": "Leo",
            "last_name": "Tolstoy",
            "username": "lev",
            "email": "leo@example.com"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/profile/lev/");

    let res = test::call_service(&app, test::TestRequest::get().uri("/profile/lev/").to_request()).await;
    let profile: Value = test::read_body_json(res).await;
    assert_eq!(profile["profile"]["last_name"], "Tolstoy");
}

#[actix_rt::test]
async fn test_registration_login_and_password_change() {
    let h = harness();
    let app = init_app!(h);

    let registration = json!({
        "username": "leo",
        "email": "leo@example.com",
        "password": PASSWORD,
        "first_name": "Leo"
    });
    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(&registration)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let auth: Value = test::read_body_json(res).await;
    assert_eq!(auth["token_type"], "Bearer");
    let bearer = format!("Bearer {}", auth["access_token"].as_str().unwrap());

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(&registration)
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);

    let req = test::TestRequest::get()
        .uri("/auth/me/")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
    let me: Value = test::read_body_json(res).await;
    assert_eq!(me["username"], "leo");
    assert_eq!(me["first_name"], "Leo");

    let req = test::TestRequest::post()
        .uri("/auth/password_change/")
        .insert_header((header::AUTHORIZATION, bearer.clone()))
        .set_json(json!({ "old_password": "wrong-password", "new_password": "battery-staple" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let req = test::TestRequest::post()
        .uri("/auth/password_change/")
        .insert_header((header::AUTHORIZATION, bearer))
        .set_json(json!({ "old_password": PASSWORD, "new_password": "battery-staple" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({ "username": "leo", "password": PASSWORD }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/auth/login/")
        .set_json(json!({ "username": "leo", "password": "battery-staple" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_registration_rejects_short_password() {
    let h = harness();
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(json!({ "username": "leo", "email": "leo@example.com", "password": "short" }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["errors"][0], "password: must be at least 8 characters");
}

#[actix_rt::test]
async fn test_usernames_must_be_usable_in_profile_urls() {
    let h = harness();
    let (_, leo_auth) = h.user("leo").await;
    let app = init_app!(h);

    let req = test::TestRequest::post()
        .uri("/auth/registration/")
        .set_json(json!({ "username": "mia/evil", "email": "mia@example.com", "password": PASSWORD }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = test::read_body_json(res).await;
    assert!(body["errors"][0].as_str().unwrap().starts_with("username: "));

    let req = test::TestRequest::post()
        .uri("/edit_profile/")
        .insert_header((header::AUTHORIZATION, leo_auth))
        .set_json(json!({
            "first_name": "",
            "last_name": "",
            "username": "leo evil",
            "email": "leo@example.com"
        }))
        .to_request();
    let res = test::call_service(&app, req).await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let res = test::call_service(&app, test::TestRequest::get().uri("/profile/leo/").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[actix_rt::test]
async fn test_unknown_routes_and_bad_ids_get_problem_bodies() {
    let h = harness();
    let app = init_app!(h);

    for uri in ["/nowhere/", "/posts/not-a-uuid/"] {
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{uri}");
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["status"], 404, "{uri}");
        assert!(body["request_id"].is_string(), "{uri}");
    }
}

#[actix_rt::test]
async fn test_health_reports_backend() {
    let h = harness();
    let app = init_app!(h);

    let res = test::call_service(&app, test::TestRequest::get().uri("/health").to_request()).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body: Value = test::read_body_json(res).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "memory");
}
