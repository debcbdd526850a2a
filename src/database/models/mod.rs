pub mod funnel;
pub mod membership;
pub mod page;
pub mod user;

pub use funnel::{Funnel, FunnelQuery, FunnelSlice, FunnelWithPages, NewFunnel};
pub use membership::WorkspaceMember;
pub use page::{NewPage, Page};
pub use user::{NewUser, User};
