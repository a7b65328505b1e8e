//! Analytics DTOs - Data Transfer Objects per bilanci e analytics di piattaforma

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Bilancio di un singolo membro dentro un circle.
/// `received` conta sia le interazioni indirizzate a lui sia l'intero punteggio
/// delle righe "entire circle" (ogni membro ne beneficia per intero).
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MemberBalanceDTO {
    pub user_id: i32,
    pub display_name: String,
    pub given: i64,
    pub received: i64,
    pub balance: i64, // given - received
}

/// Bilancio per-membro di un circle (risposta di GET /circles/{id}/balance)
#[derive(Serialize, Deserialize, Debug)]
pub struct CircleBalanceDTO {
    pub circle_id: i32,
    pub members: Vec<MemberBalanceDTO>,
}

/// Bilancio complessivo di un utente su tutti i suoi circle
#[derive(Serialize, Deserialize, Debug)]
pub struct UserBalanceDTO {
    pub user_id: i32,
    pub given: i64,
    pub received: i64,
    pub balance: i64,
}

/// Conteggio di interazioni registrate in un giorno di calendario
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DailyActivityDTO {
    pub date: NaiveDate,
    pub interactions: i64,
}

/// Conteggi cumulativi di circles e membership a fine giornata
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GrowthPointDTO {
    pub date: NaiveDate,
    pub circles: i64,
    pub members: i64,
}

/// Un circle nella classifica per numero di interazioni
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct TopCircleDTO {
    pub circle_id: i32,
    pub name: String,
    pub member_count: i64,
    pub interaction_count: i64,
}

/// Punti dati/ricevuti in un giorno, per i grafici di trend.
/// `given` = tutti i punti registrati quel giorno;
/// `received` = punti delle sole righe con destinatario individuale.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TrendPointDTO {
    pub date: NaiveDate,
    pub given: i64,
    pub received: i64,
}

/// Vista aggregata di piattaforma (risposta di GET /analytics).
/// Tutte le serie sono raggruppate per giorno di created_at (istante di
/// registrazione), non per occurred_at.
#[derive(Serialize, Deserialize, Debug)]
pub struct AnalyticsDTO {
    pub total_circles: i64,
    pub total_members: i64,
    pub total_interactions: i64,
    pub recent_activity: Vec<DailyActivityDTO>, // ultimi 7 giorni, zero-filled
    pub circle_growth: Vec<GrowthPointDTO>,     // ultimi 30 giorni, cumulativi
    pub top_circles: Vec<TopCircleDTO>,         // top 5 per interaction count
    pub interaction_trends: Vec<TrendPointDTO>, // ultimi 7 giorni
}
