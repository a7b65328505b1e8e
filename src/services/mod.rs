//! Services module - Coordinatore per tutti i service handler HTTP
//!
//! Questo modulo organizza i service handlers in sotto-moduli separati per una migliore manutenibilità.
//! Ogni modulo gestisce gli endpoint HTTP per una specifica funzionalità.

pub mod analytics;
pub mod auth;
pub mod circle;
pub mod interaction;

// Re-exports per facilitare l'import
pub use analytics::{get_circle_balance, get_my_balance, get_platform_analytics};
pub use auth::{login_user, register_user};
pub use circle::{
    create_circle, edit_circle, get_user_circles, join_circle, list_circle_members,
    remove_membership,
};
pub use interaction::{get_circle_history, log_interaction};

use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// Root endpoint - health check
pub async fn root(State(_state): State<Arc<AppState>>) -> impl IntoResponse {
    (StatusCode::OK, "Server is running!")
}
