use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_newtype!(UserId);
id_newtype!(ArticleId);
id_newtype!(CommentId);

/// Fixed set of content topics that partition the articles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Handcraft,
    Painting,
    Photography,
    Cooking,
    Other,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Handcraft,
        Category::Painting,
        Category::Photography,
        Category::Cooking,
        Category::Other,
    ];

    /// Label used on the wire and in query strings.
    pub fn as_str(self) -> &'static str {
        match self {
            Category::Handcraft => "handcraft",
            Category::Painting => "painting",
            Category::Photography => "photography",
            Category::Cooking => "cooking",
            Category::Other => "other",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Category::Handcraft => "Handcraft",
            Category::Painting => "Painting",
            Category::Photography => "Photography",
            Category::Cooking => "Cooking",
            Category::Other => "Other",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Category::Handcraft => "fas fa-cut",
            Category::Painting => "fas fa-paint-brush",
            Category::Photography => "fas fa-camera",
            Category::Cooking => "fas fa-utensils",
            Category::Other => "fas fa-ellipsis-h",
        }
    }

    /// Path fragment of the category's own listing page. `Other` has none.
    pub fn page_slug(self) -> Option<&'static str> {
        match self {
            Category::Other => None,
            category => Some(category.as_str()),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category '{0}'")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Category::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| UnknownCategory(value.to_string()))
    }
}

/// Server-side ordering of article listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    #[default]
    #[serde(rename = "-createdAt")]
    Newest,
    #[serde(rename = "-views")]
    Popular,
    #[serde(rename = "-commentsCount")]
    Commented,
}

impl SortMode {
    pub fn as_query_value(self) -> &'static str {
        match self {
            SortMode::Newest => "-createdAt",
            SortMode::Popular => "-views",
            SortMode::Commented => "-commentsCount",
        }
    }
}
