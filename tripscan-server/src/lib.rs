//! HTTP interface to the tripscan journey planner

pub mod api;
pub mod config;
pub mod dto;
pub mod state;

pub use api::create_router;
pub use config::Config;
pub use state::AppState;
