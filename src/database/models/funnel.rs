use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::page::Page;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Funnel {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// A funnel together with the pages it owns, as returned by listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunnelWithPages {
    #[serde(flatten)]
    pub funnel: Funnel,
    pub pages: Vec<Page>,
}

#[derive(Debug, Clone)]
pub struct NewFunnel {
    pub user_id: Uuid,
    pub name: String,
}

/// Owner-scoped listing query. `offset`/`limit` select rows `[offset, offset + limit - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunnelQuery {
    pub owner: Uuid,
    pub published: Option<bool>,
    pub limit: i64,
    pub offset: i64,
}

/// One page of funnels plus the owner's total matching count.
#[derive(Debug, Clone)]
pub struct FunnelSlice {
    pub funnels: Vec<FunnelWithPages>,
    pub total: i64,
}
