//! Server library - espone i moduli principali per i test

pub mod core;
pub mod dtos;
pub mod entities;
pub mod notify;
pub mod repositories;
pub mod services;

// Re-export dei tipi principali per facilitare l'import
pub use crate::core::{AppError, AppState, auth, config};
pub use crate::services::root;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Crea il router principale dell'applicazione
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/auth", configure_auth_routes())
        .nest("/circles", configure_circle_routes(state.clone()))
        .nest("/users", configure_user_routes(state.clone()))
        .nest("/analytics", configure_analytics_routes(state.clone()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Configura le routes di autenticazione (login, register)
fn configure_auth_routes() -> Router<Arc<AppState>> {
    use crate::services::*;
    Router::new()
        .route("/login", post(login_user))
        .route("/register", post(register_user))
}

/// Configura le routes per la gestione dei circle
fn configure_circle_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::{authentication_middleware, circle_membership_middleware};
    use crate::services::*;

    // Rotte che NON richiedono membership (solo autenticazione)
    let public_routes = Router::new()
        .route("/", get(get_user_circles).post(create_circle))
        .route("/join", post(join_circle))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            authentication_middleware,
        ));

    // Rotte che richiedono membership (autenticazione + membership middleware)
    let member_routes = Router::new()
        .route("/{circle_id}", patch(edit_circle))
        .route("/{circle_id}/members", get(list_circle_members))
        .route(
            "/{circle_id}/members/{membership_id}",
            delete(remove_membership),
        )
        .route(
            "/{circle_id}/interactions",
            get(get_circle_history).post(log_interaction),
        )
        .route("/{circle_id}/balance", get(get_circle_balance))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            circle_membership_middleware,
        ))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ));

    public_routes.merge(member_routes)
}

/// Configura le routes per il bilancio personale dell'utente
fn configure_user_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/me/balance", get(get_my_balance))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}

/// Configura le routes per le analytics di piattaforma
fn configure_analytics_routes(state: Arc<AppState>) -> Router<Arc<AppState>> {
    use crate::core::authentication_middleware;
    use crate::services::*;

    Router::new()
        .route("/", get(get_platform_analytics))
        .layer(middleware::from_fn_with_state(
            state,
            authentication_middleware,
        ))
}
