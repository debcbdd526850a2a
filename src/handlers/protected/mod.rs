// Handlers behind bearer authentication (/api/*).
//
// Every route here is wrapped by `middleware::require_principal`, which
// injects the caller's `Principal` into request extensions.

pub mod funnels;
pub mod sync_user;
pub mod workflows;

pub use funnels::*;
pub use sync_user::sync_user;
pub use workflows::*;
