//! Circle entity - Entità circle (gruppo di utenti che si tracciano a vicenda)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Circle {
    pub circle_id: i32,
    pub name: String,
    pub description: Option<String>,
    // codice opaco univoco: chi lo conosce può entrare nel circle
    pub invite_code: String,
    pub created_by: i32,
    pub created_at: DateTime<Utc>,
}
