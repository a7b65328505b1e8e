//! Interaction DTOs - Data Transfer Objects per le interazioni

use crate::entities::Interaction;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct InteractionDTO {
    pub interaction_id: Option<i32>,
    pub circle_id: Option<i32>,
    pub giver_id: Option<i32>,
    pub receiver_id: Option<i32>, // None = entire circle
    pub entire_circle: Option<bool>,
    pub description: Option<String>,
    pub points: Option<i32>,
    pub occurred_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Interaction> for InteractionDTO {
    fn from(value: Interaction) -> Self {
        let entire_circle = value.is_entire_circle();
        Self {
            interaction_id: Some(value.interaction_id),
            circle_id: Some(value.circle_id),
            giver_id: Some(value.giver_id),
            receiver_id: value.receiver_id,
            entire_circle: Some(entire_circle),
            description: Some(value.description),
            points: Some(value.points),
            occurred_at: Some(value.occurred_at),
            created_at: Some(value.created_at),
        }
    }
}

/// DTO per registrare una interazione.
/// `receiver_id = None` è il sentinel "entire circle": il punteggio registrato
/// diventa `point_value * numero di membri attivi` letto al momento del log.
/// `occurred_at` mancante = adesso; è ammessa la retrodatazione, non il futuro.
/// DTO a livello repository: la riga così come va scritta, con il punteggio
/// finale già calcolato (per "entire circle" la moltiplicazione è già avvenuta)
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RecordInteractionDTO {
    pub circle_id: i32,
    pub giver_id: i32,
    pub receiver_id: Option<i32>,
    pub description: String,
    pub points: i32,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateInteractionDTO {
    #[validate(length(min = 1, max = 1000, message = "Description must be between 1 and 1000 characters"))]
    pub description: String,

    #[validate(range(min = 1, message = "Point value must be at least 1"))]
    pub point_value: i32,

    #[serde(default)]
    pub receiver_id: Option<i32>,

    #[serde(default)]
    pub occurred_at: Option<DateTime<Utc>>,
}
