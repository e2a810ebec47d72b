pub mod core;

pub use crate::core::config::AppConfig;
pub use crate::core::service::{run, run_with_session, ScoutService};
