pub mod context;
pub mod render;

pub use context::{Options, build_deployment};
pub use render::{render_plan, render_report};
