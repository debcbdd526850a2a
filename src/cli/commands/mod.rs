pub mod csrf;
pub mod funnels;
pub mod templates;
pub mod token;
pub mod user;
