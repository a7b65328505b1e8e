//! Circle services - Creazione, join tramite invite code e amministrazione dei circle

use crate::core::{AppError, AppState, require_creator};
use crate::dtos::{
    CircleCreatedDTO, CircleDTO, CreateCircleDTO, CreateMembershipDTO, JoinCircleDTO,
    MembershipDTO, UpdateCircleDTO, UserCircleDTO,
};
use crate::entities::{Circle, Membership, User};
use crate::repositories::{Create, Delete, Read, Update};
use axum::{
    Extension,
    extract::{Json, Path, State},
    http::StatusCode,
};
use chrono::Utc;
use futures_util::future::{join_all, try_join_all};
use rand::{Rng, distributions::Alphanumeric};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use validator::Validate;

/// Lunghezza dell'invite code generato (alfanumerico, case-insensitive)
const INVITE_CODE_LEN: usize = 8;

/// Tentativi massimi di generazione prima di arrendersi: con 36^8 combinazioni
/// una collisione ripetuta indica un problema più serio del caso sfortunato
const INVITE_CODE_ATTEMPTS: usize = 5;

fn generate_invite_code() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INVITE_CODE_LEN)
        .map(char::from)
        .collect::<String>()
        .to_lowercase()
}

/// Alloca il circle riprovando con un nuovo invite code quando l'inserimento
/// urta la UNIQUE. La sorgente dei codici è un parametro per poter forzare
/// una collisione nei test.
async fn allocate_circle(
    state: &AppState,
    body: &CreateCircleDTO,
    creator: &User,
    mut next_code: impl FnMut() -> String,
) -> Result<Circle, AppError> {
    for attempt in 1..=INVITE_CODE_ATTEMPTS {
        let code = next_code();
        match state
            .circle
            .create_with_memberships(body, &code, creator)
            .await
        {
            Ok(circle) => return Ok(circle),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                warn!(
                    "Invite code collision on attempt {}/{}, regenerating",
                    attempt, INVITE_CODE_ATTEMPTS
                );
            }
            Err(e) => return Err(e.into()),
        }
    }

    warn!("Exhausted invite code generation attempts");
    Err(AppError::internal_server_error(
        "Could not allocate a unique invite code",
    ))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id, name = %body.name))]
pub async fn create_circle(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>, // ottenuto dall'autenticazione tramite token jwt
    Json(body): Json<CreateCircleDTO>,
) -> Result<Json<CircleCreatedDTO>, AppError> {
    debug!("Creating new circle");
    // 1. Validare il DTO (nome non vuoto, eventuali email ben formate)
    // 2. Generare un invite code casuale; in caso di collisione sulla UNIQUE
    //    rigenerare e riprovare (tentativi limitati)
    // 3. Inserire circle + membership attiva del creatore + membership pending
    //    per ogni nome indicato, in una sola transazione
    // 4. Dopo il commit, inviare le mail di invito in parallelo; i fallimenti
    //    singoli finiscono in failed_invitations, il circle resta creato
    // 5. Ritornare il circle con l'invite code e gli invii falliti

    body.validate()?;

    let circle = allocate_circle(&state, &body, &current_user, generate_invite_code).await?;

    // Fan-out delle mail di invito: concorrenti e indipendenti, mai bloccanti
    // per l'esito della creazione
    let results = join_all(body.invite_emails.iter().map(|email| {
        let notifier = &state.notifier;
        let invite_code = circle.invite_code.clone();
        let circle_id = circle.circle_id;
        async move {
            let outcome = notifier.send_invitation(email, circle_id, &invite_code).await;
            (email.clone(), outcome)
        }
    }))
    .await;

    let failed_invitations: Vec<String> = results
        .into_iter()
        .filter_map(|(email, outcome)| outcome.is_err().then_some(email))
        .collect();

    if !failed_invitations.is_empty() {
        warn!(
            "{} of {} invitation emails failed to dispatch",
            failed_invitations.len(),
            body.invite_emails.len()
        );
    }

    info!("Circle created successfully with id {}", circle.circle_id);

    let invite_code = circle.invite_code.clone();
    Ok(Json(CircleCreatedDTO {
        circle: CircleDTO::from(circle),
        invite_code,
        failed_invitations,
    }))
}

#[instrument(skip(state, current_user, body), fields(user_id = %current_user.user_id))]
pub async fn join_circle(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
    Json(body): Json<JoinCircleDTO>,
) -> Result<Json<CircleDTO>, AppError> {
    debug!("Joining circle via invite code");
    // 1. Validare il DTO (invite code e display name non vuoti)
    // 2. Risolvere l'invite code; se non esiste, errore NOT_FOUND
    // 3. Se l'utente ha già una membership attiva nel circle, errore CONFLICT
    //    (la UNIQUE sullo store copre comunque la race di due join concorrenti)
    // 4. Inserire una NUOVA membership attiva; le eventuali righe pending con
    //    lo stesso nome restano intatte, mai riconciliate
    // 5. Ritornare il circle risolto

    body.validate()?;

    let circle = state
        .circle
        .find_by_invite_code(&body.invite_code)
        .await?
        .ok_or_else(|| {
            warn!("Join attempt with unknown invite code");
            AppError::not_found("Invalid invite code")
        })?;

    if state
        .membership
        .find_active(&circle.circle_id, &current_user.user_id)
        .await?
        .is_some()
    {
        warn!(
            "User {} is already a member of circle {}",
            current_user.user_id, circle.circle_id
        );
        return Err(AppError::conflict("Already a member of this circle"));
    }

    state
        .membership
        .create(&CreateMembershipDTO {
            circle_id: circle.circle_id,
            user_id: Some(current_user.user_id),
            display_name: body.display_name.clone(),
            joined_at: Some(Utc::now()),
        })
        .await?;

    info!(
        "User {} joined circle {}",
        current_user.user_id, circle.circle_id
    );

    Ok(Json(CircleDTO::from(circle)))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_user_circles(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<Vec<UserCircleDTO>>, AppError> {
    debug!("Listing circles for user");
    // 1. Recuperare tutte le membership attive dell'utente (singola query,
    //    ordinate per data di join)
    // 2. Recuperare i circle con query parallele (primary key lookup)
    // 3. Combinare membership e circle in UserCircleDTO (join in memoria)

    let memberships = state
        .membership
        .find_many_by_user_id(&current_user.user_id)
        .await?;

    debug!("User is member of {} circles", memberships.len());

    let circles: Vec<Option<Circle>> = try_join_all(memberships.iter().map(|m| {
        let state = state.clone();
        let cid = m.circle_id;
        async move { state.circle.read(&cid).await }
    }))
    .await?;

    let result: Vec<UserCircleDTO> = memberships
        .into_iter()
        .zip(circles)
        .map(|(membership, circle)| UserCircleDTO {
            membership: MembershipDTO::from(membership),
            circle: circle.map(CircleDTO::from),
        })
        .collect();

    info!("Successfully retrieved {} circles", result.len());
    Ok(Json(result))
}

#[instrument(skip(state, current_user, body), fields(circle_id = %circle_id, user_id = %current_user.user_id))]
pub async fn edit_circle(
    State(state): State<Arc<AppState>>,
    Path(circle_id): Path<i32>,
    Extension(current_user): Extension<User>,
    Json(body): Json<UpdateCircleDTO>,
) -> Result<Json<CircleDTO>, AppError> {
    debug!("Editing circle");
    // 1. Validare il DTO
    // 2. Verificare che il circle esista
    // 3. Solo il creatore può modificare nome e descrizione
    // 4. Applicare l'update parziale e ritornare il circle aggiornato

    body.validate()?;

    let circle = state.circle.read(&circle_id).await?.ok_or_else(|| {
        warn!("Circle not found: {}", circle_id);
        AppError::not_found("Circle not found")
    })?;

    require_creator(&circle, current_user.user_id)?;

    let updated = state.circle.update(&circle_id, &body).await?;

    info!("Circle {} updated by its creator", circle_id);
    Ok(Json(CircleDTO::from(updated)))
}

#[instrument(skip(state, _membership), fields(circle_id = %circle_id))]
pub async fn list_circle_members(
    State(state): State<Arc<AppState>>,
    Path(circle_id): Path<i32>,
    Extension(_membership): Extension<Membership>, // il middleware ha già verificato la membership
) -> Result<Json<Vec<MembershipDTO>>, AppError> {
    debug!("Listing members for circle");
    let members = state.membership.find_many_by_circle_id(&circle_id).await?;

    info!("Found {} members in circle", members.len());

    let result: Vec<MembershipDTO> = members.into_iter().map(MembershipDTO::from).collect();
    Ok(Json(result))
}

#[instrument(skip(state, current_user), fields(circle_id = %circle_id, membership_id = %membership_id, user_id = %current_user.user_id))]
pub async fn remove_membership(
    State(state): State<Arc<AppState>>,
    Path((circle_id, membership_id)): Path<(i32, i32)>,
    Extension(current_user): Extension<User>,
) -> Result<StatusCode, AppError> {
    debug!("Removing membership");
    // 1. Verificare che il circle esista e che il chiamante ne sia il creatore
    // 2. Verificare che la membership esista e appartenga a quel circle
    // 3. Eliminare la riga

    let circle = state.circle.read(&circle_id).await?.ok_or_else(|| {
        warn!("Circle not found: {}", circle_id);
        AppError::not_found("Circle not found")
    })?;

    require_creator(&circle, current_user.user_id)?;

    let membership = state.membership.read(&membership_id).await?.ok_or_else(|| {
        warn!("Membership not found: {}", membership_id);
        AppError::not_found("Membership not found")
    })?;

    if membership.circle_id != circle_id {
        warn!(
            "Membership {} does not belong to circle {}",
            membership_id, circle_id
        );
        return Err(AppError::not_found("Membership not found"));
    }

    state.membership.delete(&membership_id).await?;

    info!("Membership {} removed from circle {}", membership_id, circle_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::Notifier;
    use sqlx::MySqlPool;

    fn sample_create() -> CreateCircleDTO {
        CreateCircleDTO {
            name: "Garden Club".to_string(),
            description: None,
            pending_member_names: vec![],
            invite_emails: vec![],
        }
    }

    async fn test_state(pool: &MySqlPool) -> (AppState, User) {
        let alice = sqlx::query_as!(
            User,
            "SELECT user_id, username, password FROM users WHERE user_id = 1"
        )
        .fetch_one(pool)
        .await
        .expect("fixture user");
        let state = AppState::new(pool.clone(), "secret".to_string(), Notifier::new(None));
        (state, alice)
    }

    /// Il primo codice urta la UNIQUE di un circle esistente: il secondo
    /// tentativo deve andare a buon fine con il codice rigenerato
    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles")))]
    async fn test_allocate_circle_retries_on_collision(pool: MySqlPool) -> sqlx::Result<()> {
        let (state, alice) = test_state(&pool).await;

        let mut codes = vec!["flatcode1", "freshcode"].into_iter();
        let circle = allocate_circle(&state, &sample_create(), &alice, || {
            codes.next().expect("enough codes").to_string()
        })
        .await
        .expect("second code should succeed");

        assert_eq!(circle.invite_code, "freshcode");
        assert_eq!(circle.name, "Garden Club");

        Ok(())
    }

    /// Collisione a ogni tentativo: dopo il limite l'allocazione fallisce
    /// senza lasciare nuovi circle
    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles")))]
    async fn test_allocate_circle_gives_up_after_attempts(pool: MySqlPool) -> sqlx::Result<()> {
        let (state, alice) = test_state(&pool).await;

        let result =
            allocate_circle(&state, &sample_create(), &alice, || "flatcode1".to_string()).await;
        assert!(result.is_err());

        let circles = sqlx::query!("SELECT COUNT(*) as count FROM circles")
            .fetch_one(&pool)
            .await?;
        assert_eq!(circles.count, 2);

        Ok(())
    }

    #[test]
    fn invite_code_has_expected_shape() {
        let code = generate_invite_code();
        assert_eq!(code.len(), INVITE_CODE_LEN);
        assert!(code.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn invite_codes_are_not_constant() {
        let codes: std::collections::HashSet<String> =
            (0..32).map(|_| generate_invite_code()).collect();
        assert!(codes.len() > 1);
    }
}
