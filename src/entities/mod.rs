//! Entities module - Entità del dominio applicativo
//!
//! Questo modulo contiene tutte le entità (models) che rappresentano i dati persistiti nel database.
//! Ogni entity corrisponde a una tabella nel database.

pub mod circle;
pub mod interaction;
pub mod membership;
pub mod user;

// Re-exports per facilitare l'import
pub use circle::Circle;
pub use interaction::Interaction;
pub use membership::Membership;
pub use user::User;
