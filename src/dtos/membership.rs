//! Membership DTOs - Data Transfer Objects per le membership

use crate::dtos::CircleDTO;
use crate::entities::Membership;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Struct per gestire io col client
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MembershipDTO {
    pub membership_id: Option<i32>,
    pub circle_id: Option<i32>,
    pub user_id: Option<i32>, // None = membro pending
    pub display_name: Option<String>,
    pub active: Option<bool>,
    pub joined_at: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<Membership> for MembershipDTO {
    fn from(value: Membership) -> Self {
        let active = value.is_active();
        Self {
            membership_id: Some(value.membership_id),
            circle_id: Some(value.circle_id),
            user_id: value.user_id,
            display_name: Some(value.display_name),
            active: Some(active),
            joined_at: value.joined_at,
            created_at: Some(value.created_at),
        }
    }
}

/// DTO per inserire una membership (senza membership_id).
/// `user_id = None` e `joined_at = None` inseriscono una riga pending.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CreateMembershipDTO {
    pub circle_id: i32,
    pub user_id: Option<i32>,
    pub display_name: String,
    pub joined_at: Option<DateTime<Utc>>,
}

/// Una membership dell'utente con il circle padre incorporato
/// (risposta di GET /circles)
#[derive(Serialize, Deserialize, Debug)]
pub struct UserCircleDTO {
    pub membership: MembershipDTO,
    pub circle: Option<CircleDTO>,
}
