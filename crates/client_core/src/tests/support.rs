use std::{
    io,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
};

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use shared::{
    domain::{ArticleId, Category, CommentId, UserId},
    protocol::{
        Article, ArticleListQuery, ArticleListResponse, AuthorRef, CategoryInfo, Comment,
    },
};

use crate::{
    category_page::PageServices,
    error::ClientError,
    http::ArticleClient,
    notify::{NotificationKind, Notifier},
    render::HtmlDocument,
};

pub fn article(id: i64, title: &str, tags: &[&str]) -> Article {
    Article {
        id: ArticleId(id),
        title: title.to_string(),
        content: format!("<p>Body of {title}</p>"),
        created_at: Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap(),
        author: Some(AuthorRef {
            id: UserId(1),
            username: "marta".to_string(),
        }),
        category: Category::Cooking,
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        views: 12,
        image_url: None,
        comments: Vec::new(),
        comments_count: 0,
    }
}

pub fn comment(id: i64, article_id: i64, content: &str) -> Comment {
    Comment {
        id: CommentId(id),
        article_id: ArticleId(article_id),
        author: Some(AuthorRef {
            id: UserId(2),
            username: "oleg".to_string(),
        }),
        content: content.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 3, 6, 9, 30, 0).unwrap(),
    }
}

fn server_error() -> ClientError {
    ClientError::Server {
        status: 500,
        message: "Server error".to_string(),
    }
}

/// Scripted `ArticleClient` that records every call.
#[derive(Default)]
pub struct FakeClient {
    pub list_response: Mutex<Option<ArticleListResponse>>,
    pub article: Mutex<Option<Article>>,
    pub post_error: Mutex<Option<String>>,
    pub list_queries: Mutex<Vec<ArticleListQuery>>,
    pub fetches: AtomicUsize,
    pub posts: Mutex<Vec<(ArticleId, String, String)>>,
}

impl FakeClient {
    pub fn listing(articles: Vec<Article>, total_pages: u32) -> Self {
        let client = Self::default();
        *client.list_response.lock().unwrap() = Some(ArticleListResponse {
            articles,
            total_pages,
        });
        client
    }

    pub fn with_article(self, article: Article) -> Self {
        *self.article.lock().unwrap() = Some(article);
        self
    }

    pub fn failing_posts(self, message: &str) -> Self {
        *self.post_error.lock().unwrap() = Some(message.to_string());
        self
    }

    pub fn queries(&self) -> Vec<ArticleListQuery> {
        self.list_queries.lock().unwrap().clone()
    }

    pub fn post_count(&self) -> usize {
        self.posts.lock().unwrap().len()
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ArticleClient for FakeClient {
    async fn list_articles(
        &self,
        query: &ArticleListQuery,
    ) -> Result<ArticleListResponse, ClientError> {
        self.list_queries.lock().unwrap().push(query.clone());
        self.list_response
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(server_error)
    }

    async fn fetch_article(&self, article_id: ArticleId) -> Result<Article, ClientError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.article
            .lock()
            .unwrap()
            .clone()
            .filter(|article| article.id == article_id)
            .ok_or_else(|| ClientError::Server {
                status: 404,
                message: "Article not found".to_string(),
            })
    }

    async fn post_comment(
        &self,
        article_id: ArticleId,
        token: &str,
        content: &str,
    ) -> Result<Comment, ClientError> {
        self.posts
            .lock()
            .unwrap()
            .push((article_id, token.to_string(), content.to_string()));
        if let Some(message) = self.post_error.lock().unwrap().clone() {
            return Err(ClientError::Server {
                status: 400,
                message,
            });
        }
        Ok(comment(99, article_id.0, content))
    }

    async fn categories(&self) -> Result<Vec<CategoryInfo>, ClientError> {
        Ok(Category::ALL.into_iter().map(CategoryInfo::from).collect())
    }

    async fn popular_tags(&self) -> Result<Vec<String>, ClientError> {
        Ok(Vec::new())
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<(String, NotificationKind)>>,
    pub login_dialogs: AtomicUsize,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(String, NotificationKind)> {
        self.messages.lock().unwrap().clone()
    }

    pub fn login_dialog_count(&self) -> usize {
        self.login_dialogs.load(Ordering::SeqCst)
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, kind: NotificationKind) {
        self.messages
            .lock()
            .unwrap()
            .push((message.to_string(), kind));
    }

    fn open_login_dialog(&self) {
        self.login_dialogs.fetch_add(1, Ordering::SeqCst);
    }
}

pub fn services(
    client: &Arc<FakeClient>,
    document: &Arc<HtmlDocument>,
    notifier: &Arc<RecordingNotifier>,
) -> PageServices {
    PageServices {
        client: client.clone(),
        renderer: document.clone(),
        notifier: notifier.clone(),
    }
}

/// Collects formatted log lines emitted on the current thread.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn install(&self) -> tracing::subscriber::DefaultGuard {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
