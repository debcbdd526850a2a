use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::DatabaseError;
use crate::error::ApiError;

/// Authorization level inside a shared workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceRole {
    Owner,
    Admin,
    Editor,
    Viewer,
}

impl WorkspaceRole {
    pub const ALL: [WorkspaceRole; 4] = [
        WorkspaceRole::Owner,
        WorkspaceRole::Admin,
        WorkspaceRole::Editor,
        WorkspaceRole::Viewer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkspaceRole::Owner => "owner",
            WorkspaceRole::Admin => "admin",
            WorkspaceRole::Editor => "editor",
            WorkspaceRole::Viewer => "viewer",
        }
    }
}

impl fmt::Display for WorkspaceRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkspaceRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(WorkspaceRole::Owner),
            "admin" => Ok(WorkspaceRole::Admin),
            "editor" => Ok(WorkspaceRole::Editor),
            "viewer" => Ok(WorkspaceRole::Viewer),
            other => Err(format!("unknown workspace role '{}'", other)),
        }
    }
}

/// Looks up a principal's role in a workspace. `None` means not a member.
#[async_trait]
pub trait PermissionChecker: Send + Sync {
    async fn workspace_role(&self, workspace_id: Uuid, user_id: Uuid) -> Result<Option<String>, DatabaseError>;
}

/// Require one of `allowed` for `user_id` in `workspace_id`.
///
/// Denials carry both the attempted role (raw, possibly unknown) and the required set.
pub async fn require_workspace_role(
    checker: &dyn PermissionChecker,
    workspace_id: Uuid,
    user_id: Uuid,
    allowed: &[WorkspaceRole],
) -> Result<WorkspaceRole, ApiError> {
    let actual = checker.workspace_role(workspace_id, user_id).await?;

    let granted = actual
        .as_deref()
        .and_then(|raw| raw.parse::<WorkspaceRole>().ok())
        .filter(|role| allowed.contains(role));

    match granted {
        Some(role) => Ok(role),
        None => {
            tracing::warn!(
                workspace = %workspace_id,
                user = %user_id,
                role = ?actual,
                "Workspace permission denied"
            );
            Err(ApiError::permission_denied(
                allowed.iter().map(|r| r.as_str().to_string()).collect(),
                actual,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct Roles(HashMap<Uuid, String>);

    #[async_trait]
    impl PermissionChecker for Roles {
        async fn workspace_role(&self, _workspace_id: Uuid, user_id: Uuid) -> Result<Option<String>, DatabaseError> {
            Ok(self.0.get(&user_id).cloned())
        }
    }

    #[tokio::test]
    async fn grants_known_roles_and_denies_the_rest() {
        let (editor, guest, stranger) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let checker = Roles(HashMap::from([(editor, "editor".to_string()), (guest, "guest".to_string())]));
        let ws = Uuid::new_v4();

        let granted = require_workspace_role(&checker, ws, editor, &WorkspaceRole::ALL).await.unwrap();
        assert_eq!(granted, WorkspaceRole::Editor);

        match require_workspace_role(&checker, ws, guest, &WorkspaceRole::ALL).await {
            Err(ApiError::PermissionDenied { required_roles, actual_role, .. }) => {
                assert_eq!(required_roles, vec!["owner", "admin", "editor", "viewer"]);
                assert_eq!(actual_role.as_deref(), Some("guest"));
            }
            other => panic!("expected permission denied, got {:?}", other),
        }

        assert!(matches!(
            require_workspace_role(&checker, ws, stranger, &WorkspaceRole::ALL).await,
            Err(ApiError::PermissionDenied { actual_role: None, .. })
        ));
    }

    #[tokio::test]
    async fn narrower_allow_lists_are_respected() {
        let viewer = Uuid::new_v4();
        let checker = Roles(HashMap::from([(viewer, "viewer".to_string())]));
        let result = require_workspace_role(
            &checker,
            Uuid::new_v4(),
            viewer,
            &[WorkspaceRole::Owner, WorkspaceRole::Admin],
        )
        .await;
        assert!(matches!(result, Err(ApiError::PermissionDenied { .. })));
    }

    #[test]
    fn parses_roles() {
        assert_eq!("admin".parse::<WorkspaceRole>(), Ok(WorkspaceRole::Admin));
        assert!("Admin".parse::<WorkspaceRole>().is_err());
    }
}
