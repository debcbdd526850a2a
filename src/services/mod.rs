pub mod permission;
pub mod templates;

pub use permission::{require_workspace_role, PermissionChecker, WorkspaceRole};
pub use templates::{registry, TemplateDetail, TemplateRegistry, WorkflowTemplate};
