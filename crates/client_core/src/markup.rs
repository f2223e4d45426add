//! HTML fragments for each container the pages render into.
//!
//! Reader-supplied text (titles, tags, usernames, comments) is escaped.
//! Article bodies are stored as HTML and are inserted as they are.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, Utc};
use html_escape::{encode_double_quoted_attribute as attr, encode_text as text};
use regex::Regex;
use shared::protocol::{Article, Comment};

use crate::workshops::Workshop;

pub const CARD_PLACEHOLDER: &str = "https://via.placeholder.com/300x200";
pub const THUMB_PLACEHOLDER: &str = "https://via.placeholder.com/80x60";
pub const HERO_PLACEHOLDER: &str = "https://via.placeholder.com/800x400";

const EXCERPT_CHARS: usize = 100;

static TAG_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("TAG_PATTERN: invalid regex pattern"));

pub fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%d.%m.%Y").to_string()
}

fn format_day(day: &NaiveDate) -> String {
    day.format("%d.%m.%Y").to_string()
}

pub fn article_href(article: &Article) -> String {
    format!("article.html?id={}", article.id)
}

/// First characters of the body as plain text.
pub fn excerpt(content: &str) -> String {
    let plain = TAG_PATTERN.replace_all(content, "");
    plain.chars().take(EXCERPT_CHARS).collect()
}

fn author_name<'a>(author: Option<&'a str>, fallback: &'a str) -> &'a str {
    author.filter(|name| !name.is_empty()).unwrap_or(fallback)
}

fn tag_spans(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| format!("<span class=\"tag\">#{}</span>", text(tag)))
        .collect()
}

pub fn article_grid(articles: &[Article]) -> String {
    if articles.is_empty() {
        return "<p>No articles found</p>".to_string();
    }

    articles
        .iter()
        .map(|article| {
            let image = article.image_url.as_deref().unwrap_or(CARD_PLACEHOLDER);
            format!(
                concat!(
                    "<article class=\"article-card\">",
                    "<img src=\"{image}\" alt=\"{alt}\">",
                    "<div class=\"article-card-content\">",
                    "<h3>{title}</h3>",
                    "<div class=\"meta\"><span>{date}</span><span>{author}</span></div>",
                    "<p>{excerpt}...</p>",
                    "<div class=\"tags\">{tags}</div>",
                    "<a href=\"{href}\" class=\"read-more\">Read more</a>",
                    "</div></article>"
                ),
                image = attr(image),
                alt = attr(&article.title),
                title = text(&article.title),
                date = format_date(&article.created_at),
                author = text(author_name(
                    article.author.as_ref().map(|a| a.username.as_str()),
                    "Author"
                )),
                excerpt = text(&excerpt(&article.content)),
                tags = tag_spans(&article.tags),
                href = article_href(article),
            )
        })
        .collect()
}

pub fn tag_cloud(tags: &[String]) -> String {
    tags.iter()
        .map(|tag| {
            format!(
                "<a href=\"#{}\" class=\"tag\">#{}</a>",
                attr(tag),
                text(tag)
            )
        })
        .collect()
}

/// Options of the tag filter select; the empty value means "all tags".
pub fn tag_filter_options(tags: &[String], selected: Option<&str>) -> String {
    let mut html = String::from("<option value=\"\">All tags</option>");
    for tag in tags {
        let marker = if selected == Some(tag.as_str()) {
            " selected"
        } else {
            ""
        };
        html.push_str(&format!(
            "<option value=\"{}\"{marker}>{}</option>",
            attr(tag),
            text(tag)
        ));
    }
    html
}

pub fn popular_list(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|article| {
            format!(
                concat!(
                    "<div class=\"article\">",
                    "<img src=\"{image}\" alt=\"{alt}\">",
                    "<div><h4><a href=\"{href}\">{title}</a></h4>",
                    "<span class=\"views\">{views} views</span></div>",
                    "</div>"
                ),
                image = attr(article.image_url.as_deref().unwrap_or(THUMB_PLACEHOLDER)),
                alt = attr(&article.title),
                href = article_href(article),
                title = text(&article.title),
                views = article.views,
            )
        })
        .collect()
}

pub fn workshop_list(workshops: &[Workshop]) -> String {
    if workshops.is_empty() {
        return "<p>No workshops scheduled</p>".to_string();
    }

    workshops
        .iter()
        .map(|workshop| {
            format!(
                concat!(
                    "<div class=\"workshop\"><h4>",
                    "<i class=\"fas fa-graduation-cap\"></i>",
                    "<a href=\"workshop.html?id={id}\">{title}</a></h4>",
                    "<div class=\"date\">{date}</div></div>"
                ),
                id = attr(&workshop.id),
                title = text(&workshop.title),
                date = format_day(&workshop.date),
            )
        })
        .collect()
}

pub fn article_detail(article: &Article) -> String {
    format!(
        concat!(
            "<div class=\"article-header\">",
            "<h1>{title}</h1>",
            "<div class=\"meta\">",
            "<span>Published: {date}</span>",
            "<span>Author: {author}</span>",
            "<span>Category: {category}</span>",
            "</div>",
            "<div class=\"tags\">{tags}</div>",
            "</div>",
            "<div class=\"article-image\"><img src=\"{image}\" alt=\"{alt}\"></div>",
            "<div class=\"article-body\">{body}</div>",
            "<div class=\"article-footer\"><div class=\"social-share\">",
            "<span>Share:</span>",
            "<a href=\"#\" class=\"social-icon\"><i class=\"fab fa-vk\"></i></a>",
            "<a href=\"#\" class=\"social-icon\"><i class=\"fab fa-telegram\"></i></a>",
            "<a href=\"#\" class=\"social-icon\"><i class=\"fab fa-facebook\"></i></a>",
            "</div></div>"
        ),
        title = text(&article.title),
        date = format_date(&article.created_at),
        author = text(author_name(
            article.author.as_ref().map(|a| a.username.as_str()),
            "Unknown"
        )),
        category = text(article.category.display_name()),
        tags = tag_spans(&article.tags),
        image = attr(article.image_url.as_deref().unwrap_or(HERO_PLACEHOLDER)),
        alt = attr(&article.title),
        body = article.content,
    )
}

pub fn comment_list(comments: &[Comment]) -> String {
    if comments.is_empty() {
        return "<p>No comments yet. Be the first!</p>".to_string();
    }

    comments
        .iter()
        .map(|comment| {
            format!(
                concat!(
                    "<div class=\"comment\">",
                    "<div class=\"comment-author\">{author}</div>",
                    "<div class=\"comment-date\">{date}</div>",
                    "<div class=\"comment-content\">{content}</div>",
                    "</div>"
                ),
                author = text(author_name(
                    comment.author.as_ref().map(|a| a.username.as_str()),
                    "Anonymous"
                )),
                date = format_date(&comment.created_at),
                content = text(&comment.content),
            )
        })
        .collect()
}

pub fn related_list(articles: &[Article]) -> String {
    articles
        .iter()
        .map(|article| {
            format!(
                concat!(
                    "<article class=\"article-card\">",
                    "<img src=\"{image}\" alt=\"{alt}\">",
                    "<div class=\"article-card-content\">",
                    "<h3>{title}</h3>",
                    "<div class=\"meta\"><span>{date}</span><span>{author}</span></div>",
                    "<a href=\"{href}\" class=\"read-more\">Read more</a>",
                    "</div></article>"
                ),
                image = attr(article.image_url.as_deref().unwrap_or(CARD_PLACEHOLDER)),
                alt = attr(&article.title),
                title = text(&article.title),
                date = format_date(&article.created_at),
                author = text(author_name(
                    article.author.as_ref().map(|a| a.username.as_str()),
                    "Author"
                )),
                href = article_href(article),
            )
        })
        .collect()
}

#[cfg(test)]
#[path = "tests/markup_tests.rs"]
mod tests;
