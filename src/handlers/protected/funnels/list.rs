use axum::extract::{Extension, Query, State};
use serde::{Deserialize, Serialize};

use crate::auth::Principal;
use crate::database::models::{FunnelQuery, FunnelWithPages};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

pub const DEFAULT_LIMIT: i64 = 10;
pub const DEFAULT_OFFSET: i64 = 0;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub published: Option<String>,
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub limit: i64,
    pub offset: i64,
    pub total: i64,
    pub has_more: bool,
}

impl Pagination {
    pub fn new(limit: i64, offset: i64, total: i64) -> Self {
        Self {
            limit,
            offset,
            total,
            // offset and limit are unbounded; offset + limit may overflow
            has_more: total.saturating_sub(offset) > limit,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FunnelList {
    pub funnels: Vec<FunnelWithPages>,
    pub pagination: Pagination,
}

/// GET /api/funnels - the caller's funnels, newest first, with their pages
pub async fn list(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Query(params): Query<ListQuery>,
) -> ApiResult<FunnelList> {
    let query = FunnelQuery {
        owner: principal.id,
        published: parse_published(params.published.as_deref())?,
        limit: parse_count("limit", params.limit.as_deref(), DEFAULT_LIMIT)?,
        offset: parse_count("offset", params.offset.as_deref(), DEFAULT_OFFSET)?,
    };

    let slice = state.store.list_funnels(&query).await?;
    tracing::debug!(user = %principal.id, total = slice.total, returned = slice.funnels.len(), "Listed funnels");

    Ok(ApiResponse::success(FunnelList {
        funnels: slice.funnels,
        pagination: Pagination::new(query.limit, query.offset, slice.total),
    }))
}

fn parse_published(raw: Option<&str>) -> Result<Option<bool>, ApiError> {
    match raw {
        None | Some("") => Ok(None),
        Some("true") => Ok(Some(true)),
        Some("false") => Ok(Some(false)),
        Some(_) => Err(ApiError::invalid_field("published", "must be 'true' or 'false'")),
    }
}

fn parse_count(field: &str, raw: Option<&str>, default: i64) -> Result<i64, ApiError> {
    match raw {
        None | Some("") => Ok(default),
        Some(value) => match value.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(n),
            _ => Err(ApiError::invalid_field(field, "must be a non-negative integer")),
        },
    }
}
