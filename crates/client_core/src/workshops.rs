use async_trait::async_trait;
use chrono::NaiveDate;
use shared::domain::Category;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workshop {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
}

#[async_trait]
pub trait WorkshopSource: Send + Sync {
    async fn workshops(&self, category: Category) -> Result<Vec<Workshop>, ClientError>;
}

/// Stand-in until the API grows a workshop endpoint: the same two sample
/// workshops for every category.
pub struct SampleWorkshops;

#[async_trait]
impl WorkshopSource for SampleWorkshops {
    async fn workshops(&self, _category: Category) -> Result<Vec<Workshop>, ClientError> {
        Ok(vec![
            Workshop {
                id: "1".into(),
                title: "Knitting workshop".into(),
                date: NaiveDate::from_ymd_opt(2023, 6, 15).unwrap_or_default(),
            },
            Workshop {
                id: "2".into(),
                title: "Cross-stitch basics".into(),
                date: NaiveDate::from_ymd_opt(2023, 6, 20).unwrap_or_default(),
            },
        ])
    }
}
