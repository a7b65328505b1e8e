use axum_test::TestServer;
use guberspiel_server::core::AppState;
use guberspiel_server::notify::Notifier;
use sqlx::MySqlPool;
use std::sync::Arc;

/// JWT secret condiviso da tutti i test di integrazione
pub const TEST_JWT_SECRET: &str = "ilmiobellissimosegretochevaassolutamentecambiato";

/// Crea un AppState per i test
///
/// Il Notifier non ha endpoint configurato: gli invii di inviti falliscono
/// sempre, il che rende deterministico il campo failed_invitations.
pub fn create_test_state(pool: MySqlPool) -> Arc<AppState> {
    let notifier = Notifier::new(None);
    Arc::new(AppState::new(pool, TEST_JWT_SECRET.to_string(), notifier))
}

/// Crea un TestServer per i test
pub fn create_test_server(pool: MySqlPool) -> TestServer {
    let app = guberspiel_server::create_router(create_test_state(pool));
    TestServer::new(app).expect("Failed to create test server")
}

/// Genera un JWT token per testing, valido 24 ore
pub fn create_test_jwt(user_id: i32, username: &str) -> String {
    use chrono::{Duration, Utc};
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Serialize, Deserialize)]
    struct Claims {
        id: i32,
        username: String,
        exp: usize,
        iat: usize,
    }

    let now = Utc::now();
    let expiration = now
        .checked_add_signed(Duration::hours(24))
        .expect("valid timestamp")
        .timestamp() as usize;

    let claims = Claims {
        id: user_id,
        username: username.to_string(),
        exp: expiration,
        iat: now.timestamp() as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET.as_bytes()),
    )
    .expect("Failed to create JWT token")
}
