//! Application State - Stato globale dell'applicazione
//!
//! Contiene tutti i repository, configurazioni e stato condiviso
//! necessario per gestire l'applicazione.

use crate::notify::Notifier;
use crate::repositories::{
    AnalyticsRepository, CircleRepository, InteractionRepository, MembershipRepository,
    UserRepository,
};
use sqlx::MySqlPool;

/// Stato globale dell'applicazione condiviso tra tutte le route e middleware
pub struct AppState {
    /// Repository per la gestione degli utenti
    pub user: UserRepository,

    /// Repository per la gestione dei circle
    pub circle: CircleRepository,

    /// Repository per la gestione delle membership
    pub membership: MembershipRepository,

    /// Repository per la gestione delle interazioni
    pub interaction: InteractionRepository,

    /// Repository di sola lettura per bilanci e analytics
    pub analytics: AnalyticsRepository,

    /// Secret key per JWT token
    pub jwt_secret: String,

    /// Client fire-and-forget per le mail di invito
    pub notifier: Notifier,
}

impl AppState {
    /// Crea una nuova istanza di AppState inizializzando tutti i repository
    /// con il pool di connessioni fornito, la JWT secret e il notifier.
    pub fn new(pool: MySqlPool, jwt_secret: String, notifier: Notifier) -> Self {
        Self {
            user: UserRepository::new(pool.clone()),
            circle: CircleRepository::new(pool.clone()),
            membership: MembershipRepository::new(pool.clone()),
            interaction: InteractionRepository::new(pool.clone()),
            analytics: AnalyticsRepository::new(pool),
            jwt_secret,
            notifier,
        }
    }
}
