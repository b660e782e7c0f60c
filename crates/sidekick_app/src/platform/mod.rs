mod app;
pub mod config;
mod effects;
pub mod logging;
mod status;

pub use app::run_app;
