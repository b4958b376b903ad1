//! Web layer for the transit journey planner.
//!
//! Provides JSON endpoints for planning journeys, inspecting the served
//! schedule generation and reloading it.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
