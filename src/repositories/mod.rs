//! Repositories module - Coordinatore per tutti i repository del progetto
//!
//! Questo modulo organizza i repository in sotto-moduli separati per una migliore manutenibilità.
//! Ogni repository gestisce le operazioni di database per una specifica entità;
//! AnalyticsRepository è l'eccezione: solo query aggregate di lettura, nessuna tabella propria.

// Dichiarazione dei sotto-moduli
pub mod analytics;
pub mod circle;
pub mod interaction;
pub mod membership;
pub mod traits;
pub mod user;

// Re-esportazione dei trait per facilitare l'import
pub use traits::{Create, Delete, Read, Update};

// Re-esportazione delle struct dei repository per facilitare l'import
pub use analytics::AnalyticsRepository;
pub use circle::CircleRepository;
pub use interaction::InteractionRepository;
pub use membership::MembershipRepository;
pub use user::UserRepository;
