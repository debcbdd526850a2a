use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Page {
    pub id: Uuid,
    pub funnel_id: Uuid,
    pub name: String,
    pub slug: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewPage {
    pub funnel_id: Uuid,
    pub name: String,
    pub slug: String,
}

impl NewPage {
    /// The single page seeded into a funnel created from a template.
    pub fn default_for(funnel_id: Uuid) -> Self {
        Self {
            funnel_id,
            name: "Home".to_string(),
            slug: "home".to_string(),
        }
    }
}
