pub mod template_get;

pub use template_get::template_get as workflow_template_get;
