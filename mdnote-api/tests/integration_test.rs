/// End-to-end tests for the mdnote API
///
/// These tests drive the full router against a real PostgreSQL database:
/// - Registration and login
/// - Owner scoping of documents, tags and tasks
/// - Image upload, static serving and removal
/// - Feed pagination and likes
///
/// Skipped when `DATABASE_URL` is unset.

mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{unique, TestContext};
use serde_json::json;

#[tokio::test]
async fn test_register_then_login() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let response = ctx
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": user.username, "password": "secret1" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["user"]["id"], user.id);
    assert!(response.data()["token"].as_str().is_some());

    let profile = ctx
        .request(Method::GET, "/api/users/profile", Some(&user), None)
        .await;
    assert_eq!(profile.status, StatusCode::OK);
    assert_eq!(profile.data()["username"], user.username.as_str());
    assert!(profile.data().get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_conflicts() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let response = ctx
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": user.username,
                "email": format!("{}@example.com", unique("other")),
                "password": "secret1",
            })),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let wrong_password = ctx
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": user.username, "password": "wrong-password" })),
        )
        .await;
    let unknown_user = ctx
        .request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "username": unique("ghost"), "password": "secret1" })),
        )
        .await;

    assert_eq!(wrong_password.status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_password.body, unknown_user.body);
}

#[tokio::test]
async fn test_document_crud() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let created = ctx
        .request(
            Method::POST,
            "/api/documents",
            Some(&user),
            Some(json!({ "title": " Notes ", "content": "hello" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.data()["title"], "Notes");
    assert_eq!(created.data()["filename"], "Notes.md");
    assert_eq!(created.data()["file_size"], 5);
    let id = created.data()["id"].as_i64().unwrap();

    // Title-only update keeps the content
    let updated = ctx
        .request(
            Method::PUT,
            &format!("/api/documents/{}", id),
            Some(&user),
            Some(json!({ "title": "Renamed.MD" })),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["filename"], "Renamed.MD");

    let fetched = ctx
        .request(Method::GET, &format!("/api/documents/{}", id), Some(&user), None)
        .await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.data()["content"], "hello");
    assert_eq!(fetched.data()["title"], "Renamed.MD");

    let listed = ctx.request(Method::GET, "/api/documents", Some(&user), None).await;
    assert_eq!(listed.data().as_array().unwrap().len(), 1);

    let deleted = ctx
        .request(Method::DELETE, &format!("/api/documents/{}", id), Some(&user), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let gone = ctx
        .request(Method::GET, &format!("/api/documents/{}", id), Some(&user), None)
        .await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blank_title_rejected() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let response = ctx
        .request(
            Method::POST,
            "/api/documents",
            Some(&user),
            Some(json!({ "title": "   ", "content": "x" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_foreign_document_is_not_found() {
    let Some(ctx) = TestContext::new().await else { return };
    let owner = ctx.register().await;
    let stranger = ctx.register().await;
    let id = ctx.create_document(&owner, "Private", "secret").await;

    for method in [Method::GET, Method::DELETE] {
        let response = ctx
            .request(method, &format!("/api/documents/{}", id), Some(&stranger), None)
            .await;
        assert_eq!(response.status, StatusCode::NOT_FOUND);
    }

    let update = ctx
        .request(
            Method::PUT,
            &format!("/api/documents/{}", id),
            Some(&stranger),
            Some(json!({ "content": "defaced" })),
        )
        .await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let tags = ctx
        .request(Method::GET, &format!("/api/documents/{}/tags", id), Some(&stranger), None)
        .await;
    assert_eq!(tags.status, StatusCode::NOT_FOUND);

    // Still intact for the owner
    let fetched = ctx
        .request(Method::GET, &format!("/api/documents/{}", id), Some(&owner), None)
        .await;
    assert_eq!(fetched.data()["content"], "secret");
}

#[tokio::test]
async fn test_search_and_stats() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;
    ctx.create_document(&user, "Groceries", "milk").await;
    ctx.create_document(&user, "Meeting notes", "agenda").await;

    let empty = ctx
        .request(Method::GET, "/api/documents/search?q=%20%20", Some(&user), None)
        .await;
    assert_eq!(empty.status, StatusCode::OK);
    assert_eq!(empty.data(), &json!([]));

    let found = ctx
        .request(Method::GET, "/api/documents/search?q=grocer", Some(&user), None)
        .await;
    assert_eq!(found.data().as_array().unwrap().len(), 1);
    assert_eq!(found.data()[0]["title"], "Groceries");

    let stats = ctx.request(Method::GET, "/api/documents/stats", Some(&user), None).await;
    assert_eq!(stats.status, StatusCode::OK);
    assert_eq!(stats.data()["totalCount"], 2);
    assert_eq!(stats.data()["totalSize"], 4 + 6);
    assert_eq!(stats.data()["daily"].as_array().unwrap().len(), 7);
}

fn multipart_upload(token: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "mdnote-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{f}\"\r\nContent-Type: {ct}\r\n\r\n",
            b = boundary,
            f = file_name,
            ct = content_type
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method(Method::POST)
        .uri("/api/documents/images")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_image_upload_lifecycle() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let uploaded = ctx
        .send(multipart_upload(&user.token, "Cat.PNG", "image/png", b"\x89PNG fake"))
        .await;
    assert_eq!(uploaded.status, StatusCode::OK, "{}", uploaded.body);

    let url = uploaded.data()["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/images/"));
    assert!(url.ends_with(".png"));
    assert_eq!(uploaded.data()["content"], format!("![]({})", url));
    let id = uploaded.data()["id"].as_i64().unwrap();

    let file = ctx.upload_dir.join(url.trim_start_matches("/uploads/"));
    assert!(file.exists());

    let served = ctx
        .send(Request::builder().uri(&url).body(Body::empty()).unwrap())
        .await;
    assert_eq!(served.status, StatusCode::OK);

    let doc = ctx
        .request(Method::GET, &format!("/api/documents/{}", id), Some(&user), None)
        .await;
    assert_eq!(doc.data()["title"], "Cat.PNG");
    assert_eq!(doc.data()["file_size"], 9);

    let deleted = ctx
        .request(Method::DELETE, &format!("/api/documents/{}", id), Some(&user), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(!file.exists());
}

#[tokio::test]
async fn test_non_image_upload_rejected() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let response = ctx
        .send(multipart_upload(&user.token, "notes.txt", "text/plain", b"hello"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = ctx
        .send(multipart_upload(&user.token, "logo.svg", "image/svg+xml", b"<svg/>"))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_feed_and_likes() {
    let Some(ctx) = TestContext::new().await else { return };
    let author = ctx.register().await;
    let fan = ctx.register().await;
    let id = ctx
        .create_document(&author, "Photo post", "![x](/uploads/images/p.png)")
        .await;

    let feed = ctx.request(Method::GET, "/api/posts?page=0&limit=100", None, None).await;
    assert_eq!(feed.status, StatusCode::OK);
    assert_eq!(feed.data()["page"], 1);
    assert_eq!(feed.data()["limit"], 20);
    assert!(feed.data()["total"].as_i64().unwrap() >= 1);

    for expected in 1..=2 {
        let liked = ctx
            .request(Method::POST, &format!("/api/posts/{}/like", id), Some(&fan), None)
            .await;
        assert_eq!(liked.status, StatusCode::OK);
        assert_eq!(liked.data()["likes_count"], expected);
    }

    let post = ctx.request(Method::GET, &format!("/api/posts/{}", id), None, None).await;
    assert_eq!(post.status, StatusCode::OK);
    assert_eq!(post.data()["likes_count"], 2);
    assert_eq!(post.data()["media_type"], "image");
    assert_eq!(post.data()["media_url"], "/uploads/images/p.png");
    assert_eq!(post.data()["author_name"], author.username.as_str());

    let missing = ctx
        .request(Method::POST, "/api/posts/999999999/like", Some(&fan), None)
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_document_tags_skip_foreign_ids() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;
    let other = ctx.register().await;
    let doc = ctx.create_document(&user, "Tagged", "").await;

    let mine = ctx
        .request(Method::POST, "/api/tags", Some(&user), Some(json!({ "name": "work" })))
        .await;
    assert_eq!(mine.status, StatusCode::OK);
    assert_eq!(mine.data()["color"], "#3b82f6");
    let mine = mine.data()["id"].as_i64().unwrap();

    let theirs = ctx
        .request(Method::POST, "/api/tags", Some(&other), Some(json!({ "name": "spy" })))
        .await;
    let theirs = theirs.data()["id"].as_i64().unwrap();

    let set = ctx
        .request(
            Method::PUT,
            &format!("/api/documents/{}/tags", doc),
            Some(&user),
            Some(json!({ "tag_ids": [mine, mine, theirs] })),
        )
        .await;
    assert_eq!(set.status, StatusCode::OK);

    let tags = ctx
        .request(Method::GET, &format!("/api/documents/{}/tags", doc), Some(&user), None)
        .await;
    let list = tags.data()["list"].as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], mine);

    let deleted = ctx
        .request(Method::DELETE, &format!("/api/tags/{}", mine), Some(&user), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let tags = ctx
        .request(Method::GET, &format!("/api/documents/{}/tags", doc), Some(&user), None)
        .await;
    assert!(tags.data()["list"].as_array().unwrap().is_empty());

    let foreign_delete = ctx
        .request(Method::DELETE, &format!("/api/tags/{}", theirs), Some(&user), None)
        .await;
    assert_eq!(foreign_delete.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_lifecycle() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let created = ctx
        .request(
            Method::POST,
            "/api/tasks",
            Some(&user),
            Some(json!({ "title": "Write report", "priority": "high" })),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    assert_eq!(created.data()["status"], "pending");
    assert_eq!(created.data()["priority"], "high");
    let id = created.data()["id"].as_i64().unwrap();

    let done = ctx
        .request(
            Method::PUT,
            &format!("/api/tasks/{}", id),
            Some(&user),
            Some(json!({ "status": "completed" })),
        )
        .await;
    assert_eq!(done.status, StatusCode::OK);
    assert!(done.data()["completed_at"].is_string());

    let reopened = ctx
        .request(
            Method::PUT,
            &format!("/api/tasks/{}", id),
            Some(&user),
            Some(json!({ "status": "pending" })),
        )
        .await;
    assert!(reopened.data()["completed_at"].is_null());

    let filtered = ctx
        .request(Method::GET, "/api/tasks?status=completed", Some(&user), None)
        .await;
    assert!(filtered.data()["list"].as_array().unwrap().is_empty());

    let bad_filter = ctx
        .request(Method::GET, "/api/tasks?status=archived", Some(&user), None)
        .await;
    assert_eq!(bad_filter.status, StatusCode::BAD_REQUEST);

    let blank = ctx
        .request(Method::POST, "/api/tasks", Some(&user), Some(json!({ "title": " " })))
        .await;
    assert_eq!(blank.status, StatusCode::BAD_REQUEST);

    let deleted = ctx
        .request(Method::DELETE, &format!("/api/tasks/{}", id), Some(&user), None)
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let again = ctx
        .request(Method::DELETE, &format!("/api/tasks/{}", id), Some(&user), None)
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_username_is_trimmed_before_validation() {
    let Some(ctx) = TestContext::new().await else { return };

    for username in ["      ", " ab "] {
        let email = format!("{}@example.com", unique("pad"));
        let response = ctx
            .request(
                Method::POST,
                "/api/auth/register",
                None,
                Some(json!({ "username": username, "email": email, "password": "secret1" })),
            )
            .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{:?}", username);
        assert!(response.body["error"].as_str().unwrap().contains("username"));
    }

    let name = unique("pad");
    let padded = ctx
        .request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(json!({
                "username": format!("  {}  ", name),
                "email": format!(" {}@example.com ", name),
                "password": "secret1",
            })),
        )
        .await;
    assert_eq!(padded.status, StatusCode::OK);
    assert_eq!(padded.data()["user"]["username"], name.as_str());
}

#[tokio::test]
async fn test_over_long_fields_are_bad_requests() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;
    let doc = ctx.create_document(&user, "Short", "body").await;

    let cases = [
        (Method::POST, "/api/documents".to_string(), json!({ "title": "t".repeat(300) })),
        (Method::PUT, format!("/api/documents/{}", doc), json!({ "title": "t".repeat(300) })),
        (Method::POST, "/api/tags".to_string(), json!({ "name": "n".repeat(60) })),
        (Method::POST, "/api/tasks".to_string(), json!({ "title": "t".repeat(300) })),
        (
            Method::PUT,
            "/api/users/profile".to_string(),
            json!({ "email": format!("{}@{}.com", "e".repeat(40), "d".repeat(60)) }),
        ),
    ];

    for (method, uri, body) in cases {
        let response = ctx.request(method.clone(), &uri, Some(&user), Some(body)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{} {}", method, uri);
        assert_eq!(response.body["success"], false);
    }

    let unchanged = ctx
        .request(Method::GET, &format!("/api/documents/{}", doc), Some(&user), None)
        .await;
    assert_eq!(unchanged.data()["title"], "Short");
}

#[tokio::test]
async fn test_long_upload_file_name_is_cut_to_fit() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let file_name = format!("{}.png", "n".repeat(296));
    let uploaded = ctx
        .send(multipart_upload(&user.token, &file_name, "image/png", b"\x89PNG fake"))
        .await;
    assert_eq!(uploaded.status, StatusCode::OK, "{}", uploaded.body);

    let id = uploaded.data()["id"].as_i64().unwrap();
    let doc = ctx
        .request(Method::GET, &format!("/api/documents/{}", id), Some(&user), None)
        .await;
    assert_eq!(doc.data()["title"].as_str().unwrap().chars().count(), 252);
}

fn stored_images(ctx: &TestContext) -> usize {
    std::fs::read_dir(ctx.upload_dir.join("images"))
        .map(|entries| entries.count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_upload_file_removed_when_insert_fails() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    // The token stays valid after the account row is gone, so the insert
    // fails on the users foreign key after the file has been written.
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user.id)
        .execute(&ctx.db)
        .await
        .unwrap();

    let response = ctx
        .send(multipart_upload(&user.token, "orphan.png", "image/png", b"\x89PNG fake"))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(response.body["success"], false);
    assert_eq!(stored_images(&ctx), 0);
}

#[tokio::test]
async fn test_upload_requires_multipart_body() {
    let Some(ctx) = TestContext::new().await else { return };
    let user = ctx.register().await;

    let response = ctx
        .request(
            Method::POST,
            "/api/documents/images",
            Some(&user),
            Some(json!({ "file": "not a file" })),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert!(response.body["error"].as_str().unwrap().starts_with("Invalid multipart body"));
}

#[tokio::test]
async fn test_feed_paging_tolerates_garbage() {
    let Some(ctx) = TestContext::new().await else { return };

    let feed = ctx
        .request(Method::GET, "/api/posts?page=abc&limit=xyz", None, None)
        .await;

    assert_eq!(feed.status, StatusCode::OK);
    assert_eq!(feed.data()["page"], 1);
    assert_eq!(feed.data()["limit"], 20);
}
