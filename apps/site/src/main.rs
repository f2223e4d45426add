use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use client_core::{
    article_page::{resolve_article_id, ArticlePageContainers},
    category_page::{resolve_category, CategoryContainers},
    newsletter::{NewsletterForm, NewsletterOutcome},
    ArticleClient, ArticlePageController, CategoryPageController, CommentSubmission,
    HtmlDocument, HttpArticleClient, Navigation, PageServices, SampleWorkshops, StaticToken,
    TracingNotifier,
};
use shared::domain::ArticleId;
use tracing::info;
use tracing_subscriber::EnvFilter;

const HOME: &str = "index.html";

#[derive(Parser, Debug)]
struct Args {
    #[arg(long, default_value = "http://127.0.0.1:3000")]
    server_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Renders a category page, e.g. `/cooking.html`.
    Category {
        path: String,
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        tag: Option<String>,
        #[arg(long, default_value_t = 1)]
        page: u32,
    },
    /// Renders an article page, e.g. `article.html?id=3`.
    Article { location: String },
    Comment {
        article_id: i64,
        text: String,
        #[arg(long)]
        token: Option<String>,
    },
    Categories,
    Tags,
    Subscribe { email: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();
    let args = Args::parse();

    let client = Arc::new(HttpArticleClient::new(args.server_url));
    let notifier = Arc::new(TracingNotifier);

    match args.command {
        Command::Category {
            path,
            sort,
            tag,
            page,
        } => {
            let Some(category) = resolve_category(&path) else {
                info!("site: not a category page path={path}");
                return Ok(());
            };
            let document = Arc::new(HtmlDocument::with_containers(
                CategoryContainers::for_category(category).ids(),
            ));
            let services = PageServices {
                client,
                renderer: document.clone(),
                notifier,
            };
            let mut controller =
                CategoryPageController::new(category, services, Arc::new(SampleWorkshops));
            controller.load_category_data().await;
            if let Some(sort) = sort {
                controller.select_sort(&sort).await;
            }
            if let Some(tag) = tag {
                controller.select_tag(&tag).await;
            }
            if page > 1 {
                controller.load_category_articles(page).await;
            }
            print!("{}", document.to_html());
        }
        Command::Article { location } => {
            let Some(article_id) = resolve_article_id(&location) else {
                println!("redirect: {HOME}");
                return Ok(());
            };
            let document = Arc::new(HtmlDocument::with_containers(
                ArticlePageContainers::default().ids(),
            ));
            let services = PageServices {
                client,
                renderer: document.clone(),
                notifier,
            };
            let controller =
                ArticlePageController::new(article_id, services, Arc::new(StaticToken(None)));
            match controller.load().await {
                Navigation::Stay => print!("{}", document.to_html()),
                Navigation::Home => println!("redirect: {HOME}"),
            }
        }
        Command::Comment {
            article_id,
            text,
            token,
        } => {
            let document = Arc::new(HtmlDocument::with_containers(
                ArticlePageContainers::default().ids(),
            ));
            let services = PageServices {
                client,
                renderer: document.clone(),
                notifier,
            };
            let controller = ArticlePageController::new(
                ArticleId(article_id),
                services,
                Arc::new(StaticToken(token)),
            );
            match controller.submit_comment(&text).await {
                CommentSubmission::Posted(comment) => {
                    println!("posted comment_id={}", comment.id.0);
                    print!("{}", document.to_html());
                }
                CommentSubmission::Rejected => anyhow::bail!("comment was not posted"),
            }
        }
        Command::Categories => {
            let categories = client.categories().await?;
            println!("{}", serde_json::to_string_pretty(&categories)?);
        }
        Command::Tags => {
            for tag in client.popular_tags().await? {
                println!("#{tag}");
            }
        }
        Command::Subscribe { email } => match NewsletterForm::new(notifier.as_ref()).submit(&email) {
            NewsletterOutcome::Subscribed(email) => println!("subscribed {email}"),
            NewsletterOutcome::Rejected => anyhow::bail!("invalid email address"),
        },
    }

    Ok(())
}
