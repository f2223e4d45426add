use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow},
    Pool, QueryBuilder, Row, Sqlite,
};
use std::{
    fs,
    path::{Path, PathBuf},
    str::FromStr,
};
use tracing::debug;

use shared::domain::{ArticleId, Category, CommentId, SortMode, UserId};

#[derive(Clone)]
pub struct Storage {
    pool: Pool<Sqlite>,
}

#[derive(Debug, Clone)]
pub struct NewArticle {
    pub title: String,
    pub content: String,
    pub category: Category,
    pub author_id: Option<UserId>,
    pub tags: Vec<String>,
    pub views: u64,
    pub image_url: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct StoredArticle {
    pub article_id: ArticleId,
    pub title: String,
    pub content: String,
    pub category: Category,
    pub author_id: Option<UserId>,
    pub author_username: Option<String>,
    pub tags: Vec<String>,
    pub views: u64,
    pub image_url: Option<String>,
    pub comments_count: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct StoredComment {
    pub comment_id: CommentId,
    pub article_id: ArticleId,
    pub author_id: Option<UserId>,
    pub author_username: Option<String>,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Filter and window of an article listing. `page` is 1-based.
#[derive(Debug, Clone)]
pub struct ArticleFilter {
    pub category: Option<Category>,
    pub tag: Option<String>,
    pub sort: SortMode,
    pub page: u32,
    pub limit: u32,
}

impl Default for ArticleFilter {
    fn default() -> Self {
        Self {
            category: None,
            tag: None,
            sort: SortMode::Newest,
            page: 1,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArticlePage {
    pub articles: Vec<StoredArticle>,
    pub total_count: u64,
}

const ARTICLE_COLUMNS: &str = "SELECT a.id, a.title, a.content, a.category, a.author_id, u.username,
        a.views, a.image_url, a.created_at,
        (SELECT COUNT(*) FROM comments c WHERE c.article_id = a.id) AS comments_count
     FROM articles a
     LEFT JOIN users u ON u.id = a.author_id";

impl Storage {
    pub async fn new(database_url: &str) -> Result<Self> {
        ensure_sqlite_parent_dir_exists(database_url)?;

        let connect_options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub async fn health_check(&self) -> Result<()> {
        let _: i64 = sqlx::query_scalar("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .context("sqlite ping failed")?;
        Ok(())
    }

    pub async fn create_user(&self, username: &str) -> Result<UserId> {
        let rec = sqlx::query(
            "INSERT INTO users (username) VALUES (?)
             ON CONFLICT(username) DO UPDATE SET username=excluded.username
             RETURNING id",
        )
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        Ok(UserId(rec.get::<i64, _>(0)))
    }

    pub async fn username_for_user(&self, user_id: UserId) -> Result<Option<String>> {
        let row = sqlx::query("SELECT username FROM users WHERE id = ?")
            .bind(user_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| r.get::<String, _>(0)))
    }

    pub async fn create_article(&self, article: &NewArticle) -> Result<ArticleId> {
        let created_at = article.created_at.unwrap_or_else(Utc::now);
        let mut tx = self.pool.begin().await?;

        let rec = sqlx::query(
            "INSERT INTO articles (title, content, category, author_id, views, image_url, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)
             RETURNING id",
        )
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.category.as_str())
        .bind(article.author_id.map(|id| id.0))
        .bind(i64::try_from(article.views).unwrap_or(i64::MAX))
        .bind(article.image_url.as_deref())
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await
        .context("failed to insert article")?;
        let article_id = ArticleId(rec.get::<i64, _>(0));

        for (position, tag) in article.tags.iter().enumerate() {
            sqlx::query("INSERT INTO article_tags (article_id, position, tag) VALUES (?, ?, ?)")
                .bind(article_id.0)
                .bind(position as i64)
                .bind(tag)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("failed to tag article {article_id} with '{tag}'"))?;
        }

        tx.commit().await?;
        debug!(%article_id, category = %article.category, "article stored");
        Ok(article_id)
    }

    pub async fn list_articles(&self, filter: &ArticleFilter) -> Result<ArticlePage> {
        let mut count_query =
            QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM articles a");
        push_filters(&mut count_query, filter);
        let total_count: i64 = count_query
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .context("failed to count articles")?;

        let limit = i64::from(filter.limit.max(1));
        let offset = i64::from(filter.page.max(1) - 1) * limit;

        let mut list_query = QueryBuilder::<Sqlite>::new(ARTICLE_COLUMNS);
        push_filters(&mut list_query, filter);
        list_query.push(match filter.sort {
            SortMode::Newest => " ORDER BY a.created_at DESC, a.id DESC",
            SortMode::Popular => " ORDER BY a.views DESC, a.id DESC",
            SortMode::Commented => " ORDER BY comments_count DESC, a.id DESC",
        });
        list_query
            .push(" LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = list_query
            .build()
            .fetch_all(&self.pool)
            .await
            .context("failed to list articles")?;

        let mut articles = Vec::with_capacity(rows.len());
        for row in rows {
            let mut article = article_from_row(&row)?;
            article.tags = self.tags_for_article(article.article_id).await?;
            articles.push(article);
        }

        Ok(ArticlePage {
            articles,
            total_count: u64::try_from(total_count).unwrap_or_default(),
        })
    }

    pub async fn load_article(&self, article_id: ArticleId) -> Result<Option<StoredArticle>> {
        let row = sqlx::query(&format!("{ARTICLE_COLUMNS} WHERE a.id = ?"))
            .bind(article_id.0)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };

        let mut article = article_from_row(&row)?;
        article.tags = self.tags_for_article(article_id).await?;
        Ok(Some(article))
    }

    pub async fn article_exists(&self, article_id: ArticleId) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM articles WHERE id = ?")
            .bind(article_id.0)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn tags_for_article(&self, article_id: ArticleId) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT tag FROM article_tags WHERE article_id = ? ORDER BY position ASC",
        )
        .bind(article_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
    }

    pub async fn list_comments(&self, article_id: ArticleId) -> Result<Vec<StoredComment>> {
        let rows = sqlx::query(
            "SELECT c.id, c.article_id, c.author_id, u.username, c.content, c.created_at
             FROM comments c
             LEFT JOIN users u ON u.id = c.author_id
             WHERE c.article_id = ?
             ORDER BY c.created_at ASC, c.id ASC",
        )
        .bind(article_id.0)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(comment_from_row).collect())
    }

    pub async fn insert_comment(
        &self,
        article_id: ArticleId,
        author_id: UserId,
        content: &str,
    ) -> Result<StoredComment> {
        let created_at = Utc::now();
        let rec = sqlx::query(
            "INSERT INTO comments (article_id, author_id, content, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id",
        )
        .bind(article_id.0)
        .bind(author_id.0)
        .bind(content)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await
        .with_context(|| format!("failed to insert comment for article {article_id}"))?;

        Ok(StoredComment {
            comment_id: CommentId(rec.get::<i64, _>(0)),
            article_id,
            author_id: Some(author_id),
            author_username: self.username_for_user(author_id).await?,
            content: content.to_string(),
            created_at,
        })
    }

    /// Tags ranked by how many articles carry them, most used first.
    pub async fn popular_tags(&self, limit: u32) -> Result<Vec<String>> {
        let rows = sqlx::query(
            "SELECT tag, COUNT(*) AS uses
             FROM article_tags
             GROUP BY tag
             ORDER BY uses DESC, tag ASC
             LIMIT ?",
        )
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .context("failed to aggregate tag usage")?;
        Ok(rows.into_iter().map(|r| r.get::<String, _>(0)).collect())
    }
}

fn push_filters<'a>(builder: &mut QueryBuilder<'a, Sqlite>, filter: &'a ArticleFilter) {
    builder.push(" WHERE 1 = 1");
    if let Some(category) = filter.category {
        builder.push(" AND a.category = ").push_bind(category.as_str());
    }
    if let Some(tag) = filter.tag.as_deref() {
        builder
            .push(" AND EXISTS (SELECT 1 FROM article_tags t WHERE t.article_id = a.id AND t.tag = ")
            .push_bind(tag)
            .push(")");
    }
}

fn article_from_row(r: &SqliteRow) -> Result<StoredArticle> {
    let raw_category = r.get::<String, _>(3);
    let category = Category::from_str(&raw_category)
        .map_err(|e| anyhow!("corrupt article row: {e}"))?;
    Ok(StoredArticle {
        article_id: ArticleId(r.get::<i64, _>(0)),
        title: r.get::<String, _>(1),
        content: r.get::<String, _>(2),
        category,
        author_id: r.get::<Option<i64>, _>(4).map(UserId),
        author_username: r.get::<Option<String>, _>(5),
        tags: Vec::new(),
        views: u64::try_from(r.get::<i64, _>(6)).unwrap_or_default(),
        image_url: r.get::<Option<String>, _>(7),
        created_at: r.get::<DateTime<Utc>, _>(8),
        comments_count: u64::try_from(r.get::<i64, _>(9)).unwrap_or_default(),
    })
}

fn comment_from_row(r: &SqliteRow) -> StoredComment {
    StoredComment {
        comment_id: CommentId(r.get::<i64, _>(0)),
        article_id: ArticleId(r.get::<i64, _>(1)),
        author_id: r.get::<Option<i64>, _>(2).map(UserId),
        author_username: r.get::<Option<String>, _>(3),
        content: r.get::<String, _>(4),
        created_at: r.get::<DateTime<Utc>, _>(5),
    }
}

fn ensure_sqlite_parent_dir_exists(database_url: &str) -> Result<()> {
    let Some(path) = sqlite_path(database_url) else {
        return Ok(());
    };

    let Some(parent) = path.parent() else {
        return Ok(());
    };

    fs::create_dir_all(parent).with_context(|| {
        format!(
            "failed to create parent directory '{}' for database url '{database_url}'",
            parent.display()
        )
    })?;

    Ok(())
}

fn sqlite_path(database_url: &str) -> Option<PathBuf> {
    if database_url == "sqlite::memory:" || !database_url.starts_with("sqlite:") {
        return None;
    }

    let path = database_url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:")
        .split('?')
        .next()
        .unwrap_or_default();

    if path.is_empty() {
        return None;
    }

    Some(Path::new(path).to_path_buf())
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
