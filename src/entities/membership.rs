//! Membership entity - Appartenenza di un utente a un circle

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Membership {
    pub membership_id: i32,
    pub circle_id: i32,
    // NULL = membro "pending": nominato alla creazione del circle ma non ancora entrato.
    // Un pending diventa un membro attivo solo tramite una NUOVA riga inserita alla join,
    // mai aggiornando questa (vedi decisione in DESIGN.md).
    pub user_id: Option<i32>,
    pub display_name: String,
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Membership {
    /// Un membro è attivo quando ha redento l'invite code con la propria identità
    pub fn is_active(&self) -> bool {
        self.user_id.is_some()
    }
}
