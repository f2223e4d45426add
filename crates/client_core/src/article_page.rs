//! Article detail page: the article itself, its comments, related articles
//! and the comment form.

use std::sync::Arc;

use shared::{
    domain::ArticleId,
    protocol::{ArticleListQuery, Comment},
};
use tracing::{error, info, warn};
use url::Url;

use crate::{
    category_page::PageServices,
    error::ClientError,
    markup,
    notify::{NotificationKind, TokenStore},
};

pub const RELATED_LIMIT: u32 = 3;
pub const TITLE_SUFFIX: &str = "Creative hobbies";

/// Reads the `id` query parameter from a page location. Accepts absolute
/// URLs as well as relative ones such as `article.html?id=7`.
pub fn resolve_article_id(location: &str) -> Option<ArticleId> {
    let base = Url::parse("http://localhost/").ok()?;
    let url = base.join(location).ok()?;
    let (_, value) = url.query_pairs().find(|(key, _)| key == "id")?;
    value.trim().parse().ok().map(ArticleId)
}

/// Where the page should go after a load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Stay,
    /// Leave for the home listing.
    Home,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticlePageContainers {
    pub article: String,
    pub comments: String,
    pub related: String,
}

impl Default for ArticlePageContainers {
    fn default() -> Self {
        Self {
            article: "articleContent".to_string(),
            comments: "commentsList".to_string(),
            related: "relatedArticles".to_string(),
        }
    }
}

impl ArticlePageContainers {
    pub fn ids(&self) -> [&str; 3] {
        [&self.article, &self.comments, &self.related]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentSubmission {
    /// Stored; the comment input can be cleared.
    Posted(Comment),
    Rejected,
}

pub struct ArticlePageController {
    services: PageServices,
    tokens: Arc<dyn TokenStore>,
    containers: ArticlePageContainers,
    article_id: ArticleId,
}

impl ArticlePageController {
    pub fn new(article_id: ArticleId, services: PageServices, tokens: Arc<dyn TokenStore>) -> Self {
        Self {
            services,
            tokens,
            containers: ArticlePageContainers::default(),
            article_id,
        }
    }

    pub fn article_id(&self) -> ArticleId {
        self.article_id
    }

    pub fn containers(&self) -> &ArticlePageContainers {
        &self.containers
    }

    /// Full page load. Stops early when the article cannot be shown.
    pub async fn load(&self) -> Navigation {
        if self.load_article().await == Navigation::Home {
            return Navigation::Home;
        }
        self.load_comments().await;
        self.load_related_articles().await;
        Navigation::Stay
    }

    pub async fn load_article(&self) -> Navigation {
        match self.services.client.fetch_article(self.article_id).await {
            Ok(article) => {
                self.services
                    .renderer
                    .set_title(&format!("{} - {TITLE_SUFFIX}", article.title));
                self.services
                    .renderer
                    .replace(&self.containers.article, markup::article_detail(&article));
                Navigation::Stay
            }
            Err(err) => {
                error!(
                    article_id = self.article_id.0,
                    "article: load failed: {err}"
                );
                let message = err.server_message().unwrap_or("Failed to load article");
                self.services.notifier.notify(message, NotificationKind::Error);
                Navigation::Home
            }
        }
    }

    pub async fn load_comments(&self) {
        match self.services.client.fetch_article(self.article_id).await {
            Ok(article) => self
                .services
                .renderer
                .replace(&self.containers.comments, markup::comment_list(&article.comments)),
            Err(err) => {
                error!(
                    article_id = self.article_id.0,
                    "article: comment load failed: {err}"
                );
                self.services
                    .notifier
                    .notify("Failed to load comments", NotificationKind::Error);
            }
        }
    }

    pub async fn load_related_articles(&self) {
        let query = ArticleListQuery {
            limit: Some(RELATED_LIMIT),
            ..ArticleListQuery::default()
        };
        match self.services.client.list_articles(&query).await {
            Ok(response) => self
                .services
                .renderer
                .replace(&self.containers.related, markup::related_list(&response.articles)),
            Err(err) => warn!(
                article_id = self.article_id.0,
                "article: related articles load failed: {err}"
            ),
        }
    }

    pub async fn submit_comment(&self, text: &str) -> CommentSubmission {
        let content = text.trim();
        if content.is_empty() {
            let err = ClientError::EmptyInput("Enter comment text".to_string());
            warn!(
                article_id = self.article_id.0,
                "article: comment rejected: {err}"
            );
            self.services
                .notifier
                .notify(&err.to_string(), NotificationKind::Error);
            return CommentSubmission::Rejected;
        }

        let Some(token) = self.tokens.token() else {
            warn!(
                article_id = self.article_id.0,
                "article: comment rejected: no auth token"
            );
            self.services
                .notifier
                .notify("You must log in to comment", NotificationKind::Error);
            self.services.notifier.open_login_dialog();
            return CommentSubmission::Rejected;
        };

        match self
            .services
            .client
            .post_comment(self.article_id, &token, content)
            .await
        {
            Ok(comment) => {
                info!(
                    article_id = self.article_id.0,
                    comment_id = comment.id.0,
                    "article: comment posted"
                );
                self.services
                    .notifier
                    .notify("Comment added", NotificationKind::Success);
                self.load_comments().await;
                CommentSubmission::Posted(comment)
            }
            Err(err) => {
                error!(
                    article_id = self.article_id.0,
                    "article: comment submit failed: {err}"
                );
                let message = err.server_message().unwrap_or("Failed to post comment");
                self.services.notifier.notify(message, NotificationKind::Error);
                CommentSubmission::Rejected
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/article_page_tests.rs"]
mod tests;
