use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::ArticleId,
    error::ApiError,
    protocol::{
        Article, ArticleListQuery, ArticleListResponse, CategoryInfo, Comment,
        CreateCommentRequest,
    },
};
use tracing::debug;

use crate::error::ClientError;

/// REST surface of the blog API used by the page controllers.
#[async_trait]
pub trait ArticleClient: Send + Sync {
    async fn list_articles(
        &self,
        query: &ArticleListQuery,
    ) -> Result<ArticleListResponse, ClientError>;
    async fn fetch_article(&self, article_id: ArticleId) -> Result<Article, ClientError>;
    async fn post_comment(
        &self,
        article_id: ArticleId,
        token: &str,
        content: &str,
    ) -> Result<Comment, ClientError>;
    async fn categories(&self) -> Result<Vec<CategoryInfo>, ClientError>;
    async fn popular_tags(&self) -> Result<Vec<String>, ClientError>;
}

pub struct HttpArticleClient {
    http: Client,
    server_url: String,
}

impl HttpArticleClient {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), server_url)
    }

    pub fn with_client(http: Client, server_url: impl Into<String>) -> Self {
        let server_url = server_url.into().trim_end_matches('/').to_string();
        Self { http, server_url }
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }
}

#[async_trait]
impl ArticleClient for HttpArticleClient {
    async fn list_articles(
        &self,
        query: &ArticleListQuery,
    ) -> Result<ArticleListResponse, ClientError> {
        debug!(?query, "listing articles");
        let response = self
            .http
            .get(format!("{}/api/articles", self.server_url))
            .query(query)
            .send()
            .await?;
        read_json(response).await
    }

    async fn fetch_article(&self, article_id: ArticleId) -> Result<Article, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/articles/{}", self.server_url, article_id.0))
            .send()
            .await?;
        read_json(response).await
    }

    async fn post_comment(
        &self,
        article_id: ArticleId,
        token: &str,
        content: &str,
    ) -> Result<Comment, ClientError> {
        let response = self
            .http
            .post(format!(
                "{}/api/articles/{}/comments",
                self.server_url, article_id.0
            ))
            .bearer_auth(token)
            .json(&CreateCommentRequest {
                content: content.to_string(),
            })
            .send()
            .await?;
        read_json(response).await
    }

    async fn categories(&self) -> Result<Vec<CategoryInfo>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/categories", self.server_url))
            .send()
            .await?;
        read_json(response).await
    }

    async fn popular_tags(&self) -> Result<Vec<String>, ClientError> {
        let response = self
            .http
            .get(format!("{}/api/tags/popular", self.server_url))
            .send()
            .await?;
        read_json(response).await
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let fallback = status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string();
    let message = response
        .json::<ApiError>()
        .await
        .map(|body| body.message)
        .unwrap_or(fallback);
    Err(ClientError::Server {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
