use shared::{
    domain::{ArticleId, Category, SortMode, UserId},
    error::ApiError,
    protocol::{
        Article, ArticleListQuery, ArticleListResponse, AuthorRef, CategoryInfo, Comment,
        LoginResponse,
    },
};
use storage::{ArticleFilter, Storage, StoredArticle, StoredComment};
use tracing::error;

use crate::{
    auth::{mint_token, AuthConfig},
    config::MAX_PAGE_SIZE,
};

pub const POPULAR_TAG_LIMIT: u32 = 10;
const MAX_COMMENT_CHARS: usize = 5000;

#[derive(Clone)]
pub struct ApiContext {
    pub storage: Storage,
    pub auth: AuthConfig,
    pub page_size: u32,
}

pub fn list_categories() -> Vec<CategoryInfo> {
    Category::ALL.into_iter().map(CategoryInfo::from).collect()
}

pub async fn popular_tags(ctx: &ApiContext) -> Result<Vec<String>, ApiError> {
    ctx.storage
        .popular_tags(POPULAR_TAG_LIMIT)
        .await
        .map_err(internal)
}

pub async fn list_articles(
    ctx: &ApiContext,
    query: ArticleListQuery,
) -> Result<ArticleListResponse, ApiError> {
    let limit = query
        .limit
        .unwrap_or(ctx.page_size)
        .clamp(1, MAX_PAGE_SIZE);
    let filter = ArticleFilter {
        category: query.category,
        tag: query.tag.filter(|tag| !tag.trim().is_empty()),
        sort: query.sort.unwrap_or(SortMode::Newest),
        page: query.page.unwrap_or(1).max(1),
        limit,
    };

    let page = ctx.storage.list_articles(&filter).await.map_err(internal)?;
    let total_pages = u32::try_from(page.total_count.div_ceil(u64::from(limit)))
        .unwrap_or(u32::MAX);

    Ok(ArticleListResponse {
        articles: page
            .articles
            .into_iter()
            .map(|stored| article_from_stored(stored, Vec::new()))
            .collect(),
        total_pages,
    })
}

pub async fn get_article(ctx: &ApiContext, article_id: ArticleId) -> Result<Article, ApiError> {
    let stored = ctx
        .storage
        .load_article(article_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("Article not found"))?;
    let comments = ctx
        .storage
        .list_comments(article_id)
        .await
        .map_err(internal)?
        .into_iter()
        .map(comment_from_stored)
        .collect();
    Ok(article_from_stored(stored, comments))
}

pub async fn add_comment(
    ctx: &ApiContext,
    author_id: UserId,
    article_id: ArticleId,
    content: &str,
) -> Result<Comment, ApiError> {
    let content = content.trim();
    if content.is_empty() {
        return Err(ApiError::validation("Comment text is required"));
    }
    if content.chars().count() > MAX_COMMENT_CHARS {
        return Err(ApiError::validation(format!(
            "Comment must be at most {MAX_COMMENT_CHARS} characters"
        )));
    }

    if !ctx
        .storage
        .article_exists(article_id)
        .await
        .map_err(internal)?
    {
        return Err(ApiError::not_found("Article not found"));
    }

    let stored = ctx
        .storage
        .insert_comment(article_id, author_id, content)
        .await
        .map_err(internal)?;
    Ok(comment_from_stored(stored))
}

pub async fn login(ctx: &ApiContext, username: &str) -> Result<LoginResponse, ApiError> {
    let username = username.trim();
    if username.is_empty() {
        return Err(ApiError::validation("Username is required"));
    }

    let user_id = ctx
        .storage
        .create_user(username)
        .await
        .map_err(internal)?;
    let token = mint_token(&ctx.auth, user_id, username).map_err(|e| internal(e.into()))?;
    Ok(LoginResponse { user_id, token })
}

fn article_from_stored(stored: StoredArticle, comments: Vec<Comment>) -> Article {
    Article {
        id: stored.article_id,
        title: stored.title,
        content: stored.content,
        created_at: stored.created_at,
        author: author_ref(stored.author_id, stored.author_username),
        category: stored.category,
        tags: stored.tags,
        views: stored.views,
        image_url: stored.image_url,
        comments,
        comments_count: stored.comments_count,
    }
}

fn comment_from_stored(stored: StoredComment) -> Comment {
    Comment {
        id: stored.comment_id,
        article_id: stored.article_id,
        author: author_ref(stored.author_id, stored.author_username),
        content: stored.content,
        created_at: stored.created_at,
    }
}

fn author_ref(id: Option<UserId>, username: Option<String>) -> Option<AuthorRef> {
    Some(AuthorRef {
        id: id?,
        username: username?,
    })
}

fn internal(err: anyhow::Error) -> ApiError {
    error!(error = %err, "request failed");
    ApiError::internal()
}

#[cfg(test)]
#[path = "tests/mod_tests.rs"]
mod tests;
