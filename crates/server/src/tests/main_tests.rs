use super::*;
use axum::{
    body::{self, Body},
    http::Request,
};
use shared::domain::Category;
use storage::NewArticle;
use tower::ServiceExt;

async fn test_app() -> (Router, Storage, AuthConfig) {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let auth = AuthConfig {
        secret: "route-secret".to_string(),
        ttl_seconds: 60,
    };
    let api = ApiContext {
        storage: storage.clone(),
        auth: auth.clone(),
        page_size: 2,
    };
    let app = build_router(Arc::new(AppState { api }));
    (app, storage, auth)
}

async fn seed(storage: &Storage, title: &str, category: Category, tags: &[&str]) -> i64 {
    storage
        .create_article(&NewArticle {
            title: title.to_string(),
            content: format!("<p>{title}</p>"),
            category,
            author_id: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            views: 0,
            image_url: None,
            created_at: None,
        })
        .await
        .expect("article")
        .0
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json")
}

#[tokio::test]
async fn healthz_reports_ok_when_storage_is_ready() {
    let (app, _storage, _auth) = test_app().await;
    let request = Request::get("/healthz")
        .body(Body::empty())
        .expect("request");
    let response = app.oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let body = body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(body.as_ref(), b"ok");
}

#[tokio::test]
async fn categories_route_returns_static_list() {
    let (app, _storage, _auth) = test_app().await;
    let response = app
        .oneshot(
            Request::get("/api/categories")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);

    let value: serde_json::Value = json_body(response).await;
    let ids: Vec<_> = value
        .as_array()
        .expect("array")
        .iter()
        .map(|c| c["id"].as_str().expect("id").to_string())
        .collect();
    assert_eq!(
        ids,
        vec!["handcraft", "painting", "photography", "cooking", "other"]
    );
    assert_eq!(value[0]["icon"], "fas fa-cut");
}

#[tokio::test]
async fn popular_tags_route_ranks_by_usage() {
    let (app, storage, _auth) = test_app().await;
    seed(&storage, "a", Category::Cooking, &["soup", "bread"]).await;
    seed(&storage, "b", Category::Cooking, &["soup"]).await;

    let response = app
        .oneshot(
            Request::get("/api/tags/popular")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let tags: Vec<String> = json_body(response).await;
    assert_eq!(tags, vec!["soup", "bread"]);
}

#[tokio::test]
async fn article_list_route_reads_query_parameters() {
    let (app, storage, _auth) = test_app().await;
    for title in ["one", "two", "three"] {
        seed(&storage, title, Category::Cooking, &["dinner"]).await;
    }
    seed(&storage, "sketch", Category::Painting, &["dinner"]).await;

    let response = app
        .clone()
        .oneshot(
            Request::get("/api/articles?category=cooking&page=1&sort=-views&tag=dinner")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    let value: serde_json::Value = json_body(response).await;
    assert_eq!(value["totalPages"], 2);
    assert_eq!(value["articles"].as_array().expect("articles").len(), 2);

    let limited = app
        .oneshot(
            Request::get("/api/articles?category=cooking&limit=3")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let page: ArticleListResponse = json_body(limited).await;
    assert_eq!(page.total_pages, 1);
    assert!(page
        .articles
        .iter()
        .all(|article| article.category == Category::Cooking));
}

#[tokio::test]
async fn unknown_article_returns_404_with_message() {
    let (app, _storage, _auth) = test_app().await;
    let response = app
        .oneshot(
            Request::get("/api/articles/12345")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let err: ApiError = json_body(response).await;
    assert_eq!(err.message, "Article not found");
}

#[tokio::test]
async fn comment_requires_bearer_token() {
    let (app, storage, _auth) = test_app().await;
    let article_id = seed(&storage, "Film cameras", Category::Photography, &[]).await;

    let response = app
        .oneshot(
            Request::post(format!("/api/articles/{article_id}/comments"))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "content": "hi" }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let err: ApiError = json_body(response).await;
    assert!(!err.message.is_empty());
}

#[tokio::test]
async fn login_then_comment_then_read_back() {
    let (app, storage, _auth) = test_app().await;
    let article_id = seed(&storage, "Film cameras", Category::Photography, &[]).await;

    let login_response = app
        .clone()
        .oneshot(
            Request::post("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::json!({ "username": "route-user" }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(login_response.status(), StatusCode::OK);
    let login: LoginResponse = json_body(login_response).await;

    let comment_response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/articles/{article_id}/comments"))
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", login.token))
                .body(Body::from(
                    serde_json::json!({ "content": "Great shots" }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(comment_response.status(), StatusCode::CREATED);
    let comment: Comment = json_body(comment_response).await;
    assert_eq!(comment.content, "Great shots");

    let article_response = app
        .oneshot(
            Request::get(format!("/api/articles/{article_id}"))
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    let article: Article = json_body(article_response).await;
    assert_eq!(article.comments.len(), 1);
    assert_eq!(
        article.comments[0]
            .author
            .as_ref()
            .map(|a| a.username.as_str()),
        Some("route-user")
    );
}

#[tokio::test]
async fn blank_comment_is_rejected_with_400() {
    let (app, storage, auth) = test_app().await;
    let article_id = seed(&storage, "Embroidery", Category::Handcraft, &[]).await;
    let user = storage.create_user("stitcher").await.expect("user");
    let token = auth::mint_token(&auth, user, "stitcher").expect("token");

    let response = app
        .oneshot(
            Request::post(format!("/api/articles/{article_id}/comments"))
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {token}"))
                .body(Body::from(
                    serde_json::json!({ "content": "   " }).to_string(),
                ))
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, ApiError) {
    let response = app.oneshot(request).await.expect("response");
    let status = response.status();
    (status, json_body(response).await)
}

#[tokio::test]
async fn malformed_list_query_returns_message_body() {
    let (app, _storage, _auth) = test_app().await;

    for uri in ["/api/articles?category=knitting", "/api/articles?page=-1"] {
        let (status, err) = send(
            app.clone(),
            Request::get(uri).body(Body::empty()).expect("request"),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(err.code, Some(ErrorCode::Validation), "{uri}");
        assert!(!err.message.is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn non_numeric_article_id_is_not_found() {
    let (app, _storage, auth) = test_app().await;

    let (status, err) = send(
        app.clone(),
        Request::get("/api/articles/abc")
            .body(Body::empty())
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err.message, "Article not found");

    let token = auth::mint_token(&auth, shared::domain::UserId(1), "reader").expect("token");
    let (status, err) = send(
        app,
        Request::post("/api/articles/abc/comments")
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from(
                serde_json::json!({ "content": "hi" }).to_string(),
            ))
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(err.message, "Article not found");
}

#[tokio::test]
async fn malformed_json_body_returns_message_body() {
    let (app, storage, auth) = test_app().await;
    let article_id = seed(&storage, "Watercolour", Category::Painting, &[]).await;
    let user = storage.create_user("painter").await.expect("user");
    let token = auth::mint_token(&auth, user, "painter").expect("token");

    let (status, err) = send(
        app.clone(),
        Request::post(format!("/api/articles/{article_id}/comments"))
            .header("content-type", "application/json")
            .header("authorization", format!("Bearer {token}"))
            .body(Body::from("{\"content\": "))
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.code, Some(ErrorCode::Validation));

    let (status, err) = send(
        app,
        Request::post("/api/auth/login")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::json!({ "name": "x" }).to_string()))
            .expect("request"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(err.code, Some(ErrorCode::Validation));
}
