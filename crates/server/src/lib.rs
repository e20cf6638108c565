pub mod api;
pub mod metrics;
pub mod render;
pub mod state;
