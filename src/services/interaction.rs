//! Interaction services - Registrazione e storico delle interazioni di cura

use crate::core::{AppError, AppState};
use crate::dtos::{CreateInteractionDTO, HistoryQuery, InteractionDTO, RecordInteractionDTO};
use crate::entities::Membership;
use crate::repositories::Create;
use axum::{
    Extension,
    extract::{Json, Path, Query, State},
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Numero massimo di interazioni ritornate per pagina dello storico
const HISTORY_PAGE_SIZE: i64 = 50;

#[instrument(skip(state, membership, body), fields(circle_id = %circle_id, giver_id = %membership.user_id.unwrap_or(-1)))]
pub async fn log_interaction(
    State(state): State<Arc<AppState>>,
    Path(circle_id): Path<i32>,
    Extension(membership): Extension<Membership>, // membership attiva del chiamante, dal middleware
    Json(body): Json<CreateInteractionDTO>,
) -> Result<Json<InteractionDTO>, AppError> {
    debug!("Logging interaction");
    // 1. Validare il DTO (descrizione non vuota, punti >= 1)
    // 2. occurred_at mancante = adesso; la retrodatazione è ammessa, il futuro no
    // 3. Destinatario individuale: deve essere un membro ATTIVO del circle
    // 4. Destinatario assente = "entire circle": il punteggio registrato è
    //    point_value * numero di membri attivi letto ora (giver incluso)
    // 5. Inserire la riga con il punteggio finale e ritornarla

    body.validate()?;

    let giver_id = membership
        .user_id
        .ok_or_else(|| AppError::internal_server_error("Membership without user"))?;

    let occurred_at = body.occurred_at.unwrap_or_else(Utc::now);
    if occurred_at > Utc::now() {
        warn!("Rejected interaction dated in the future");
        return Err(AppError::bad_request("Interaction date cannot be in the future"));
    }

    let points = match body.receiver_id {
        Some(receiver_id) => {
            let receiver = state
                .membership
                .find_active(&circle_id, &receiver_id)
                .await?;
            if receiver.is_none() {
                warn!(
                    "Receiver {} is not an active member of circle {}",
                    receiver_id, circle_id
                );
                return Err(AppError::bad_request(
                    "Receiver is not an active member of this circle",
                ));
            }
            body.point_value
        }
        None => {
            let active_members = state.membership.count_active(&circle_id).await?;
            debug!(
                "Entire circle interaction, multiplying by {} active members",
                active_members
            );
            body.point_value
                .checked_mul(active_members as i32)
                .ok_or_else(|| AppError::bad_request("Point value is too large"))?
        }
    };

    let interaction = state
        .interaction
        .create(&RecordInteractionDTO {
            circle_id,
            giver_id,
            receiver_id: body.receiver_id,
            description: body.description,
            points,
            occurred_at,
        })
        .await?;

    info!(
        "Interaction {} logged in circle {} worth {} points",
        interaction.interaction_id, circle_id, interaction.points
    );

    Ok(Json(InteractionDTO::from(interaction)))
}

#[instrument(skip(state, _membership, query), fields(circle_id = %circle_id))]
pub async fn get_circle_history(
    State(state): State<Arc<AppState>>,
    Path(circle_id): Path<i32>,
    Extension(_membership): Extension<Membership>, // il middleware ha già verificato la membership
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<InteractionDTO>>, AppError> {
    debug!("Fetching circle history");
    // Pagina di storico ordinata dal più recente; before_date è il cursore
    // per caricare le pagine successive

    let interactions = state
        .interaction
        .find_many_paginated(&circle_id, query.before_date.as_ref(), HISTORY_PAGE_SIZE)
        .await?;

    info!("Retrieved {} interactions", interactions.len());

    let result: Vec<InteractionDTO> = interactions
        .into_iter()
        .map(InteractionDTO::from)
        .collect();
    Ok(Json(result))
}
