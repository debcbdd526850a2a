use axum::extract::{Extension, State};
use serde::Serialize;

use crate::auth::Principal;
use crate::database::models::{NewUser, User};
use crate::middleware::{ApiResponse, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SyncedUser {
    pub user: User,
    pub message: &'static str,
}

/// POST /api/sync-user - upsert the caller's user row
///
/// Idempotent on `id`; the email is refreshed from the token every time.
/// Rate limiting is applied by the route layer before authentication.
pub async fn sync_user(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<SyncedUser> {
    let user = state.store.upsert_user(&NewUser::from(&principal)).await?;
    tracing::info!(user = %user.id, "User synced");

    Ok(ApiResponse::success(SyncedUser {
        user,
        message: "User synced successfully",
    }))
}
