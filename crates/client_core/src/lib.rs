//! Client side of the hobby blog: the REST client, HTML markup builders and
//! the page controllers that tie them to a renderer.

pub mod article_page;
pub mod category_page;
pub mod error;
pub mod http;
pub mod markup;
pub mod newsletter;
pub mod notify;
pub mod pagination;
pub mod render;
pub mod workshops;

pub use article_page::{ArticlePageController, CommentSubmission, Navigation};
pub use category_page::{CategoryPageController, PageQuery, PageServices};
pub use error::ClientError;
pub use http::{ArticleClient, HttpArticleClient};
pub use notify::{NotificationKind, Notifier, StaticToken, TokenStore, TracingNotifier};
pub use render::{DomRenderer, HtmlDocument};
pub use workshops::{SampleWorkshops, Workshop, WorkshopSource};

#[cfg(test)]
#[path = "tests/support.rs"]
pub(crate) mod test_support;
