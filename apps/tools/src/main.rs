use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use shared::domain::{ArticleId, Category, UserId};
use storage::{NewArticle, Storage};

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/blog.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    CreateUser {
        username: String,
    },
    CreateArticle {
        title: String,
        /// Article body, HTML.
        content: String,
        #[arg(long, default_value = "other")]
        category: String,
        #[arg(long)]
        author_id: Option<i64>,
        /// Comma separated, order is kept.
        #[arg(long, value_delimiter = ',')]
        tags: Vec<String>,
        #[arg(long, default_value_t = 0)]
        views: u64,
        #[arg(long)]
        image_url: Option<String>,
    },
    AddComment {
        article_id: i64,
        author_id: i64,
        content: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::CreateUser { username } => {
            let user_id = storage.create_user(&username).await?;
            println!("created user_id={}", user_id.0);
        }
        Command::CreateArticle {
            title,
            content,
            category,
            author_id,
            tags,
            views,
            image_url,
        } => {
            let category: Category = category.parse()?;
            let tags = tags
                .into_iter()
                .map(|tag| tag.trim().to_string())
                .filter(|tag| !tag.is_empty())
                .collect();
            let article_id = storage
                .create_article(&NewArticle {
                    title,
                    content,
                    category,
                    author_id: author_id.map(UserId),
                    tags,
                    views,
                    image_url,
                    created_at: None,
                })
                .await?;
            println!("created article_id={}", article_id.0);
        }
        Command::AddComment {
            article_id,
            author_id,
            content,
        } => {
            let article_id = ArticleId(article_id);
            if !storage.article_exists(article_id).await? {
                anyhow::bail!("article {article_id} does not exist");
            }
            let comment = storage
                .insert_comment(article_id, UserId(author_id), content.trim())
                .await
                .context("comment insert failed")?;
            println!("created comment_id={}", comment.comment_id.0);
        }
    }

    Ok(())
}
