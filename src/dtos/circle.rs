//! Circle DTOs - Data Transfer Objects per i circle

use crate::entities::Circle;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateEmail, ValidationError};

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CircleDTO {
    pub circle_id: Option<i32>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub invite_code: Option<String>,
    pub created_by: Option<i32>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Circle> for CircleDTO {
    fn from(value: Circle) -> Self {
        Self {
            circle_id: Some(value.circle_id),
            name: Some(value.name),
            description: value.description,
            invite_code: Some(value.invite_code),
            created_by: Some(value.created_by),
            created_at: Some(value.created_at),
        }
    }
}

/// DTO per creare un nuovo circle.
/// `pending_member_names` genera una riga membership pending per ciascun nome;
/// `invite_emails` fa partire una mail di invito per ciascun indirizzo dopo il commit.
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct CreateCircleDTO {
    #[validate(length(min = 1, max = 200, message = "Circle name must be between 1 and 200 characters"))]
    pub name: String,

    pub description: Option<String>,

    #[serde(default)]
    pub pending_member_names: Vec<String>,

    #[serde(default)]
    #[validate(custom(function = validate_email_list))]
    pub invite_emails: Vec<String>,
}

/// DTO per aggiornare un circle (solo campi modificabili, solo dal creatore)
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct UpdateCircleDTO {
    #[validate(length(min = 1, max = 200, message = "Circle name must be between 1 and 200 characters"))]
    pub name: Option<String>,
    pub description: Option<String>,
}

/// DTO per entrare in un circle tramite invite code
#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct JoinCircleDTO {
    #[validate(length(min = 1, message = "Invite code must not be empty"))]
    pub invite_code: String,

    #[validate(length(min = 1, max = 100, message = "Display name must be between 1 and 100 characters"))]
    pub display_name: String,
}

/// Risposta alla creazione: il circle con il suo invite code, più gli
/// indirizzi per cui l'invio della mail di invito è fallito (successo parziale,
/// il circle resta creato)
#[derive(Serialize, Deserialize, Debug)]
pub struct CircleCreatedDTO {
    pub circle: CircleDTO,
    pub invite_code: String,
    pub failed_invitations: Vec<String>,
}

fn validate_email_list(emails: &Vec<String>) -> Result<(), ValidationError> {
    for email in emails {
        if !email.validate_email() {
            return Err(ValidationError::new("invalid_email"));
        }
    }
    Ok(())
}
