//! Category listing page: tag metadata, the paginated article grid, popular
//! articles and workshops for one category.

use std::sync::Arc;

use shared::{
    domain::{Category, SortMode},
    protocol::{Article, ArticleListQuery},
};
use tracing::{debug, error, warn};

use crate::{
    http::ArticleClient,
    markup,
    notify::{NotificationKind, Notifier},
    pagination::{pagination_controls, pagination_markup, PageControl},
    render::DomRenderer,
    workshops::WorkshopSource,
};

pub const TAG_METADATA_LIMIT: u32 = 5;
pub const POPULAR_LIMIT: u32 = 3;
pub const TAG_CLOUD_LIMIT: usize = 10;

/// Path fragments recognised as category pages, checked in order.
const PATH_CATEGORIES: [(&str, Category); 4] = [
    ("handcraft", Category::Handcraft),
    ("painting", Category::Painting),
    ("photography", Category::Photography),
    ("cooking", Category::Cooking),
];

pub fn resolve_category(location_path: &str) -> Option<Category> {
    PATH_CATEGORIES
        .iter()
        .find(|(fragment, _)| location_path.contains(fragment))
        .map(|(_, category)| *category)
}

/// Unique tags across `articles`, in first-seen order.
pub fn collect_unique_tags(articles: &[Article]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for tag in articles.iter().flat_map(|article| article.tags.iter()) {
        if !unique.contains(tag) {
            unique.push(tag.clone());
        }
    }
    unique
}

/// Maps the sort select value to a sort mode; unknown values mean newest.
pub fn sort_for_select_value(value: &str) -> SortMode {
    match value {
        "popular" => SortMode::Popular,
        "commented" => SortMode::Commented,
        _ => SortMode::Newest,
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Current listing selection. Rebuilt by every sort, tag or page change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    pub category: Category,
    pub page: u32,
    pub sort: SortMode,
    pub tag: Option<String>,
}

impl PageQuery {
    pub fn new(category: Category) -> Self {
        Self {
            category,
            page: 1,
            sort: SortMode::default(),
            tag: None,
        }
    }

    pub fn to_list_query(&self) -> ArticleListQuery {
        ArticleListQuery {
            category: Some(self.category),
            page: Some(self.page.max(1)),
            sort: Some(self.sort),
            tag: self.tag.clone(),
            limit: None,
        }
    }
}

/// Ids of the elements a category page renders into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryContainers {
    pub tag_cloud: String,
    pub tag_filter: String,
    pub articles: String,
    pub pagination: String,
    pub popular: String,
    pub workshops: String,
}

impl CategoryContainers {
    pub fn for_category(category: Category) -> Self {
        let slug = category.as_str();
        let title = capitalize(slug);
        Self {
            tag_cloud: format!("{slug}Tags"),
            tag_filter: format!("filter{title}Tags"),
            articles: format!("{slug}Articles"),
            pagination: format!("{slug}Pagination"),
            popular: format!("popular{title}Articles"),
            workshops: format!("{slug}Workshops"),
        }
    }

    pub fn ids(&self) -> [&str; 6] {
        [
            &self.tag_cloud,
            &self.tag_filter,
            &self.articles,
            &self.pagination,
            &self.popular,
            &self.workshops,
        ]
    }
}

/// Collaborators shared by the page controllers.
#[derive(Clone)]
pub struct PageServices {
    pub client: Arc<dyn ArticleClient>,
    pub renderer: Arc<dyn DomRenderer>,
    pub notifier: Arc<dyn Notifier>,
}

pub struct CategoryPageController {
    services: PageServices,
    workshops: Arc<dyn WorkshopSource>,
    containers: CategoryContainers,
    query: PageQuery,
    tags: Vec<String>,
}

impl CategoryPageController {
    pub fn new(
        category: Category,
        services: PageServices,
        workshops: Arc<dyn WorkshopSource>,
    ) -> Self {
        Self {
            services,
            workshops,
            containers: CategoryContainers::for_category(category),
            query: PageQuery::new(category),
            tags: Vec::new(),
        }
    }

    /// Controller for the page at `location_path`, or `None` when the path
    /// names no known category.
    pub fn for_location(
        location_path: &str,
        services: PageServices,
        workshops: Arc<dyn WorkshopSource>,
    ) -> Option<Self> {
        let Some(category) = resolve_category(location_path) else {
            debug!("category: no category in path={location_path}");
            return None;
        };
        Some(Self::new(category, services, workshops))
    }

    pub fn category(&self) -> Category {
        self.query.category
    }

    pub fn containers(&self) -> &CategoryContainers {
        &self.containers
    }

    pub fn page_query(&self) -> &PageQuery {
        &self.query
    }

    /// Full page load. Each step fails on its own; none aborts the others.
    pub async fn load_category_data(&mut self) {
        self.load_tag_metadata().await;
        self.load_category_articles(1).await;
        self.load_popular_articles().await;
        self.load_workshops().await;
    }

    pub async fn load_tag_metadata(&mut self) {
        let query = ArticleListQuery {
            category: Some(self.query.category),
            limit: Some(TAG_METADATA_LIMIT),
            ..ArticleListQuery::default()
        };
        match self.services.client.list_articles(&query).await {
            Ok(response) => {
                self.tags = collect_unique_tags(&response.articles);
                self.render_tags();
            }
            Err(err) => {
                error!(
                    category = %self.query.category,
                    "category: tag metadata load failed: {err}"
                );
                self.services
                    .notifier
                    .notify("Failed to load data", NotificationKind::Error);
            }
        }
    }

    fn render_tags(&self) {
        let cloud: Vec<String> = self.tags.iter().take(TAG_CLOUD_LIMIT).cloned().collect();
        self.services
            .renderer
            .replace(&self.containers.tag_cloud, markup::tag_cloud(&cloud));
        self.services.renderer.replace(
            &self.containers.tag_filter,
            markup::tag_filter_options(&self.tags, self.query.tag.as_deref()),
        );
    }

    /// Loads `page` with the current sort and tag selection. Returns the
    /// rendered pagination controls on success.
    pub async fn load_category_articles(&mut self, page: u32) -> Option<Vec<PageControl>> {
        self.query.page = page.max(1);
        let query = self.query.to_list_query();
        match self.services.client.list_articles(&query).await {
            Ok(response) => {
                self.services
                    .renderer
                    .replace(&self.containers.articles, markup::article_grid(&response.articles));
                Some(self.render_pagination(self.query.page, response.total_pages))
            }
            Err(err) => {
                error!(
                    category = %self.query.category,
                    page = self.query.page,
                    "category: article list load failed: {err}"
                );
                self.services
                    .notifier
                    .notify("Failed to load articles", NotificationKind::Error);
                None
            }
        }
    }

    pub fn render_pagination(&self, current_page: u32, total_pages: u32) -> Vec<PageControl> {
        let controls = pagination_controls(current_page, total_pages);
        self.services
            .renderer
            .replace(&self.containers.pagination, pagination_markup(&controls));
        controls
    }

    pub async fn load_popular_articles(&self) {
        let query = ArticleListQuery {
            category: Some(self.query.category),
            sort: Some(SortMode::Popular),
            limit: Some(POPULAR_LIMIT),
            ..ArticleListQuery::default()
        };
        match self.services.client.list_articles(&query).await {
            Ok(response) => self
                .services
                .renderer
                .replace(&self.containers.popular, markup::popular_list(&response.articles)),
            Err(err) => {
                error!(
                    category = %self.query.category,
                    "category: popular articles load failed: {err}"
                );
                self.services
                    .notifier
                    .notify("Failed to load popular articles", NotificationKind::Error);
            }
        }
    }

    pub async fn load_workshops(&self) {
        match self.workshops.workshops(self.query.category).await {
            Ok(workshops) => self
                .services
                .renderer
                .replace(&self.containers.workshops, markup::workshop_list(&workshops)),
            Err(err) => warn!(
                category = %self.query.category,
                "category: workshop load failed: {err}"
            ),
        }
    }

    /// Follows a pagination control. The current-page marker does nothing.
    pub async fn activate(&mut self, control: PageControl) -> Option<Vec<PageControl>> {
        let page = control.target()?;
        self.load_category_articles(page).await
    }

    /// Sort select changed: reload from the first page.
    pub async fn select_sort(&mut self, value: &str) -> Option<Vec<PageControl>> {
        self.query.sort = sort_for_select_value(value);
        self.load_category_articles(1).await
    }

    /// Tag filter changed; an empty value clears the filter.
    pub async fn select_tag(&mut self, value: &str) -> Option<Vec<PageControl>> {
        let value = value.trim();
        self.query.tag = (!value.is_empty()).then(|| value.to_string());
        self.load_category_articles(1).await
    }
}

#[cfg(test)]
#[path = "tests/category_page_tests.rs"]
mod tests;
