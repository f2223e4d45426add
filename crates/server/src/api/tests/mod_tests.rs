use super::*;
use shared::error::ErrorCode;
use storage::NewArticle;

async fn setup(page_size: u32) -> ApiContext {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    ApiContext {
        storage,
        auth: AuthConfig {
            secret: "s".into(),
            ttl_seconds: 60,
        },
        page_size,
    }
}

async fn seed(ctx: &ApiContext, title: &str, category: Category, tags: &[&str]) -> ArticleId {
    ctx.storage
        .create_article(&NewArticle {
            title: title.to_string(),
            content: "<p>body</p>".to_string(),
            category,
            author_id: None,
            tags: tags.iter().map(|t| t.to_string()).collect(),
            views: 0,
            image_url: None,
            created_at: None,
        })
        .await
        .expect("article")
}

#[test]
fn categories_are_the_five_fixed_topics() {
    let categories = list_categories();
    assert_eq!(categories.len(), 5);
    assert_eq!(categories[3].id, Category::Cooking);
    assert_eq!(categories[3].icon, "fas fa-utensils");
    assert_eq!(categories[4].name, "Other");
}

#[tokio::test]
async fn total_pages_rounds_up_over_page_size() {
    let ctx = setup(2).await;
    for title in ["a", "b", "c", "d", "e"] {
        seed(&ctx, title, Category::Cooking, &[]).await;
    }
    seed(&ctx, "elsewhere", Category::Painting, &[]).await;

    let response = list_articles(
        &ctx,
        ArticleListQuery {
            category: Some(Category::Cooking),
            ..ArticleListQuery::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(response.total_pages, 3);
    assert_eq!(response.articles.len(), 2);

    let last = list_articles(
        &ctx,
        ArticleListQuery {
            category: Some(Category::Cooking),
            page: Some(3),
            ..ArticleListQuery::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(last.articles.len(), 1);
}

#[tokio::test]
async fn blank_tag_filter_is_ignored() {
    let ctx = setup(10).await;
    seed(&ctx, "tagged", Category::Cooking, &["soup"]).await;
    seed(&ctx, "plain", Category::Cooking, &[]).await;

    let response = list_articles(
        &ctx,
        ArticleListQuery {
            tag: Some("  ".into()),
            ..ArticleListQuery::default()
        },
    )
    .await
    .expect("list");
    assert_eq!(response.articles.len(), 2);
}

#[tokio::test]
async fn missing_article_is_not_found() {
    let ctx = setup(10).await;
    let err = get_article(&ctx, ArticleId(999))
        .await
        .expect_err("should fail");
    assert_eq!(err.code, Some(ErrorCode::NotFound));
    assert_eq!(err.message, "Article not found");
}

#[tokio::test]
async fn added_comment_appears_nested_in_article() {
    let ctx = setup(10).await;
    let id = seed(&ctx, "Watercolor basics", Category::Painting, &[]).await;
    let session = login(&ctx, "alice").await.expect("login");

    let comment = add_comment(&ctx, session.user_id, id, "  lovely  ")
        .await
        .expect("comment");
    assert_eq!(comment.content, "lovely");
    assert_eq!(
        comment.author.as_ref().map(|a| a.username.as_str()),
        Some("alice")
    );

    let article = get_article(&ctx, id).await.expect("article");
    assert_eq!(article.comments.len(), 1);
    assert_eq!(article.comments_count, 1);
}

#[tokio::test]
async fn empty_comment_is_a_validation_error() {
    let ctx = setup(10).await;
    let id = seed(&ctx, "Pottery", Category::Handcraft, &[]).await;
    let user = ctx.storage.create_user("bob").await.expect("user");
    let err = add_comment(&ctx, user, id, "   ")
        .await
        .expect_err("should fail");
    assert_eq!(err.code, Some(ErrorCode::Validation));
}

#[tokio::test]
async fn comment_on_missing_article_is_not_found() {
    let ctx = setup(10).await;
    let user = ctx.storage.create_user("bob").await.expect("user");
    let err = add_comment(&ctx, user, ArticleId(77), "hello")
        .await
        .expect_err("should fail");
    assert_eq!(err.code, Some(ErrorCode::NotFound));
}

#[tokio::test]
async fn login_rejects_blank_username() {
    let ctx = setup(10).await;
    let err = login(&ctx, " ").await.expect_err("should fail");
    assert_eq!(err.code, Some(ErrorCode::Validation));
}
