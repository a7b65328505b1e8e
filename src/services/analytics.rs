//! Analytics services - Bilanci e vista aggregata di piattaforma

use crate::core::{AppError, AppState};
use crate::dtos::{
    AnalyticsDTO, CircleBalanceDTO, DailyActivityDTO, GrowthPointDTO, TrendPointDTO,
    UserBalanceDTO,
};
use crate::entities::{Membership, User};
use axum::{
    Extension,
    extract::{Json, Path, State},
};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Giorni coperti da attività recente e trend
const ACTIVITY_WINDOW_DAYS: i64 = 7;

/// Giorni coperti dalla serie di crescita
const GROWTH_WINDOW_DAYS: i64 = 30;

/// Dimensione della classifica dei circle più attivi
const TOP_CIRCLES_LIMIT: i64 = 5;

#[instrument(skip(state, _membership), fields(circle_id = %circle_id))]
pub async fn get_circle_balance(
    State(state): State<Arc<AppState>>,
    Path(circle_id): Path<i32>,
    Extension(_membership): Extension<Membership>, // il middleware ha già verificato la membership
) -> Result<Json<CircleBalanceDTO>, AppError> {
    debug!("Computing circle balance");
    let members = state.analytics.member_balances(&circle_id).await?;

    info!("Balance computed for {} members", members.len());

    Ok(Json(CircleBalanceDTO { circle_id, members }))
}

#[instrument(skip(state, current_user), fields(user_id = %current_user.user_id))]
pub async fn get_my_balance(
    State(state): State<Arc<AppState>>,
    Extension(current_user): Extension<User>,
) -> Result<Json<UserBalanceDTO>, AppError> {
    debug!("Computing user balance across circles");
    let given = state.analytics.user_given(&current_user.user_id).await?;
    let received = state.analytics.user_received(&current_user.user_id).await?;

    info!("User balance: given {} received {}", given, received);

    Ok(Json(UserBalanceDTO {
        user_id: current_user.user_id,
        given,
        received,
        balance: given - received,
    }))
}

#[instrument(skip(state))]
pub async fn get_platform_analytics(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalyticsDTO>, AppError> {
    debug!("Building platform analytics");
    // 1. Totali di piattaforma (circles, membership, interazioni)
    // 2. Attività e trend degli ultimi 7 giorni, zero-filled sui giorni vuoti
    // 3. Crescita cumulativa degli ultimi 30 giorni (conteggi a fine giornata)
    // 4. Classifica dei 5 circle con più interazioni

    let today = Utc::now().date_naive();
    let activity_window = date_window(today, ACTIVITY_WINDOW_DAYS);
    let growth_window = date_window(today, GROWTH_WINDOW_DAYS);
    let activity_since = start_of_day(activity_window[0]);

    let (total_circles, total_members, total_interactions) = state.analytics.totals().await?;

    let activity_rows = state
        .analytics
        .daily_interaction_counts(&activity_since)
        .await?;
    let trend_rows = state.analytics.daily_point_trends(&activity_since).await?;
    let circles_per_day = state.analytics.daily_new_circles().await?;
    let members_per_day = state.analytics.daily_new_memberships().await?;
    let top_circles = state.analytics.top_circles(TOP_CIRCLES_LIMIT).await?;

    let analytics = AnalyticsDTO {
        total_circles,
        total_members,
        total_interactions,
        recent_activity: fill_activity(&activity_window, activity_rows),
        circle_growth: cumulative_growth(&growth_window, &circles_per_day, &members_per_day),
        top_circles,
        interaction_trends: fill_trends(&activity_window, trend_rows),
    };

    info!(
        "Analytics built: {} circles, {} members, {} interactions",
        analytics.total_circles, analytics.total_members, analytics.total_interactions
    );

    Ok(Json(analytics))
}

/// Finestra di `days` giorni di calendario che termina con `today`, in ordine crescente
fn date_window(today: NaiveDate, days: i64) -> Vec<NaiveDate> {
    (0..days)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .collect()
}

fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

/// Riempie i giorni senza interazioni con conteggio zero
fn fill_activity(window: &[NaiveDate], rows: Vec<DailyActivityDTO>) -> Vec<DailyActivityDTO> {
    window
        .iter()
        .map(|&date| {
            let interactions = rows
                .iter()
                .find(|r| r.date == date)
                .map(|r| r.interactions)
                .unwrap_or(0);
            DailyActivityDTO { date, interactions }
        })
        .collect()
}

/// Riempie i giorni senza punti con valori zero
fn fill_trends(window: &[NaiveDate], rows: Vec<TrendPointDTO>) -> Vec<TrendPointDTO> {
    window
        .iter()
        .map(|&date| {
            rows.iter()
                .find(|r| r.date == date)
                .cloned()
                .unwrap_or(TrendPointDTO {
                    date,
                    given: 0,
                    received: 0,
                })
        })
        .collect()
}

/// Trasforma i conteggi giornalieri in serie cumulative: per ogni giorno della
/// finestra, quanti circle e membership esistevano a fine giornata
fn cumulative_growth(
    window: &[NaiveDate],
    circles_per_day: &[(NaiveDate, i64)],
    members_per_day: &[(NaiveDate, i64)],
) -> Vec<GrowthPointDTO> {
    let up_to = |rows: &[(NaiveDate, i64)], date: NaiveDate| -> i64 {
        rows.iter()
            .filter(|(day, _)| *day <= date)
            .map(|(_, count)| count)
            .sum()
    };

    window
        .iter()
        .map(|&date| GrowthPointDTO {
            date,
            circles: up_to(circles_per_day, date),
            members: up_to(members_per_day, date),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    #[test]
    fn window_ends_today_and_is_ascending() {
        let window = date_window(day(10), 7);
        assert_eq!(window.len(), 7);
        assert_eq!(window[0], day(4));
        assert_eq!(window[6], day(10));
    }

    #[test]
    fn activity_gaps_are_zero_filled() {
        let window = date_window(day(5), 3);
        let rows = vec![DailyActivityDTO {
            date: day(4),
            interactions: 2,
        }];

        let filled = fill_activity(&window, rows);

        assert_eq!(filled.len(), 3);
        assert_eq!(filled[0].interactions, 0);
        assert_eq!(filled[1].interactions, 2);
        assert_eq!(filled[2].interactions, 0);
    }

    #[test]
    fn trend_gaps_are_zero_filled() {
        let window = date_window(day(5), 3);
        let rows = vec![TrendPointDTO {
            date: day(5),
            given: 6,
            received: 2,
        }];

        let filled = fill_trends(&window, rows);

        assert_eq!(filled[0], TrendPointDTO { date: day(3), given: 0, received: 0 });
        assert_eq!(filled[2].given, 6);
    }

    #[test]
    fn growth_accumulates_counts_before_the_window_too() {
        let window = date_window(day(10), 2);
        // Un circle creato ben prima della finestra deve comparire nei cumulativi
        let circles = vec![(day(1), 1), (day(9), 1), (day(10), 2)];
        let members = vec![(day(1), 3), (day(10), 1)];

        let growth = cumulative_growth(&window, &circles, &members);

        assert_eq!(growth[0], GrowthPointDTO { date: day(9), circles: 2, members: 3 });
        assert_eq!(growth[1], GrowthPointDTO { date: day(10), circles: 4, members: 4 });
    }
}
