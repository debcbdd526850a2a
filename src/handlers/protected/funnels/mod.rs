pub mod create;
pub mod list;

pub use create::create as funnels_post;
pub use list::list as funnels_get;
