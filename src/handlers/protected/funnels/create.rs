use axum::extract::{rejection::JsonRejection, Extension, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::auth::Principal;
use crate::database::models::{Funnel, NewFunnel, NewPage, NewUser};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateFunnelRequest {
    #[serde(default)]
    pub name: Option<Value>,
    #[serde(default)]
    pub template: Option<Value>,
}

impl CreateFunnelRequest {
    /// Trimmed name, or a validation error when absent, non-string or blank.
    fn validated_name(&self) -> Result<String, ApiError> {
        match &self.name {
            Some(Value::String(name)) if !name.trim().is_empty() => Ok(name.trim().to_string()),
            Some(Value::String(_)) => Err(ApiError::invalid_field("name", "must not be empty")),
            Some(_) => Err(ApiError::invalid_field("name", "must be a string")),
            None => Err(ApiError::invalid_field("name", "is required")),
        }
    }

    fn wants_template(&self) -> bool {
        !matches!(self.template, None | Some(Value::Null) | Some(Value::Bool(false)))
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedFunnel {
    pub funnel: Funnel,
    pub message: &'static str,
    /// False when no template was requested or the default page could not be written.
    pub page_created: bool,
}

/// POST /api/funnels - create a funnel for the caller
///
/// The owner row is upserted first; if that fails nothing else is written.
/// The template's default page is best-effort: its failure is reported via
/// `pageCreated` and never rolls back the funnel.
pub async fn create(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    payload: Result<Json<CreateFunnelRequest>, JsonRejection>,
) -> ApiResult<CreatedFunnel> {
    let Json(request) = payload.map_err(|rejection| ApiError::invalid_json(rejection.body_text()))?;
    let name = request.validated_name()?;

    state.store.upsert_user(&NewUser::from(&principal)).await?;

    let funnel = state
        .store
        .insert_funnel(&NewFunnel {
            user_id: principal.id,
            name,
        })
        .await?;
    tracing::info!(user = %principal.id, funnel = %funnel.id, "Funnel created");

    let page_created = if request.wants_template() {
        match state.store.insert_page(&NewPage::default_for(funnel.id)).await {
            Ok(page) => {
                tracing::debug!(funnel = %funnel.id, page = %page.id, "Default page created");
                true
            }
            Err(e) => {
                tracing::warn!(funnel = %funnel.id, "Default page creation failed, keeping funnel: {}", e);
                false
            }
        }
    } else {
        false
    };

    Ok(ApiResponse::created(CreatedFunnel {
        funnel,
        message: "Funnel created successfully",
        page_created,
    }))
}
