// Handlers reachable without authentication.

pub mod root;

pub use root::{health, not_found, root};
