use axum::extract::{Extension, Path, State};
use serde::Serialize;
use uuid::Uuid;

use crate::auth::Principal;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::{require_workspace_role, TemplateDetail, WorkspaceRole};
use crate::state::AppState;

/// Any member may read the template catalog.
pub const TEMPLATE_READ_ROLES: &[WorkspaceRole] = &WorkspaceRole::ALL;

#[derive(Debug, Serialize)]
pub struct TemplateEnvelope {
    pub template: TemplateDetail<'static>,
}

/// GET /api/workspaces/:workspace_id/workflows/templates/:template_id
///
/// Membership is checked before the catalog lookup, so non-members learn
/// nothing about which template ids exist.
pub async fn template_get(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((workspace_id, template_id)): Path<(String, String)>,
) -> ApiResult<TemplateEnvelope> {
    let workspace_id = Uuid::parse_str(&workspace_id)
        .map_err(|_| ApiError::invalid_field("workspace_id", "must be a UUID"))?;

    let role = require_workspace_role(
        state.permissions.as_ref(),
        workspace_id,
        principal.id,
        TEMPLATE_READ_ROLES,
    )
    .await?;

    let template = state
        .templates
        .get(&template_id)
        .ok_or_else(|| ApiError::not_found(format!("Workflow template '{}' not found", template_id)))?;

    tracing::debug!(workspace = %workspace_id, user = %principal.id, role = %role, template = %template.id, "Template fetched");

    Ok(ApiResponse::success(TemplateEnvelope {
        template: TemplateDetail::from(template),
    }))
}
