//! Interaction entity - Atto di cura registrato (giver -> receiver, con punteggio)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Interaction {
    pub interaction_id: i32,
    pub circle_id: i32,
    pub giver_id: i32,
    // NULL = beneficiario "entire circle": i punti sono già stati moltiplicati
    // per il numero di membri attivi al momento della registrazione
    pub receiver_id: Option<i32>,
    pub description: String,
    pub points: i32,
    // occurred_at = quando l'atto è avvenuto (retrodatabile dall'utente)
    // created_at = quando è stato registrato
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Interaction {
    pub fn is_entire_circle(&self) -> bool {
        self.receiver_id.is_none()
    }
}
