//! AnalyticsRepository - Query aggregate di sola lettura
//!
//! Nessuna tabella propria: bilanci e metriche di piattaforma sono ricalcolati
//! a ogni chiamata sulle tabelle di circles, membership e interactions.
//! Tutte le somme sono CAST a SIGNED perché SUM() in MySQL produce DECIMAL.
//!
//! I bucket giornalieri usano DATE(created_at), valutata nella time zone di
//! sessione MySQL: la sessione deve restare in UTC (il default dei TIMESTAMP
//! qui) perché il service costruisce la finestra da Utc::now(). Con una
//! sessione non-UTC le righe a cavallo di mezzanotte finirebbero in un giorno
//! che la finestra zero-filled non conosce.

use crate::dtos::{DailyActivityDTO, MemberBalanceDTO, TopCircleDTO, TrendPointDTO};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{Error, MySqlPool};
use tracing::{debug, instrument};

// ANALYTICS REPOSITORY
pub struct AnalyticsRepository {
    connection_pool: MySqlPool,
}

impl AnalyticsRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Bilancio per-membro di un circle: punti dati, punti ricevuti e saldo.
    /// Le righe "entire circle" valgono per intero per ogni membro attivo.
    #[instrument(skip(self), fields(circle_id = %circle_id))]
    pub async fn member_balances(&self, circle_id: &i32) -> Result<Vec<MemberBalanceDTO>, Error> {
        debug!("Computing member balances for circle");
        let rows = sqlx::query!(
            r#"
            SELECT
                m.user_id as "user_id!: i32",
                m.display_name,
                CAST(COALESCE(g.given, 0) AS SIGNED) as "given!: i64",
                CAST(COALESCE(r.received, 0) + e.entire AS SIGNED) as "received!: i64"
            FROM circle_memberships m
            LEFT JOIN (
                SELECT giver_id, SUM(points) AS given
                FROM interactions
                WHERE circle_id = ?
                GROUP BY giver_id
            ) g ON g.giver_id = m.user_id
            LEFT JOIN (
                SELECT receiver_id, SUM(points) AS received
                FROM interactions
                WHERE circle_id = ? AND receiver_id IS NOT NULL
                GROUP BY receiver_id
            ) r ON r.receiver_id = m.user_id
            CROSS JOIN (
                SELECT COALESCE(SUM(points), 0) AS entire
                FROM interactions
                WHERE circle_id = ? AND receiver_id IS NULL
            ) e
            WHERE m.circle_id = ? AND m.user_id IS NOT NULL
            ORDER BY m.joined_at, m.membership_id
            "#,
            circle_id,
            circle_id,
            circle_id,
            circle_id
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| MemberBalanceDTO {
                user_id: row.user_id,
                display_name: row.display_name,
                given: row.given,
                received: row.received,
                balance: row.given - row.received,
            })
            .collect())
    }

    /// Punti totali dati da un utente, su tutti i circle
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_given(&self, user_id: &i32) -> Result<i64, Error> {
        let row = sqlx::query!(
            r#"
            SELECT CAST(COALESCE(SUM(points), 0) AS SIGNED) as "total!: i64"
            FROM interactions
            WHERE giver_id = ?
            "#,
            user_id
        )
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(row.total)
    }

    /// Punti totali ricevuti da un utente: righe indirizzate a lui più le righe
    /// "entire circle" dei circle in cui è membro attivo
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn user_received(&self, user_id: &i32) -> Result<i64, Error> {
        let row = sqlx::query!(
            r#"
            SELECT CAST(COALESCE(SUM(i.points), 0) AS SIGNED) as "total!: i64"
            FROM interactions i
            WHERE i.receiver_id = ?
               OR (i.receiver_id IS NULL AND EXISTS (
                    SELECT 1 FROM circle_memberships m
                    WHERE m.circle_id = i.circle_id AND m.user_id = ?
               ))
            "#,
            user_id,
            user_id
        )
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(row.total)
    }

    /// Conteggi totali di piattaforma: (circles, membership, interazioni).
    /// Le membership contano anche le righe pending.
    #[instrument(skip(self))]
    pub async fn totals(&self) -> Result<(i64, i64, i64), Error> {
        debug!("Counting platform totals");
        let circles = sqlx::query!("SELECT COUNT(*) as count FROM circles")
            .fetch_one(&self.connection_pool)
            .await?
            .count;
        let members = sqlx::query!("SELECT COUNT(*) as count FROM circle_memberships")
            .fetch_one(&self.connection_pool)
            .await?
            .count;
        let interactions = sqlx::query!("SELECT COUNT(*) as count FROM interactions")
            .fetch_one(&self.connection_pool)
            .await?
            .count;

        Ok((circles, members, interactions))
    }

    /// Interazioni registrate per giorno di calendario (created_at) da `since`
    /// in poi. Come per tutti i bucket giornalieri qui, DATE() assume la
    /// sessione in UTC (vedi doc del modulo).
    #[instrument(skip(self))]
    pub async fn daily_interaction_counts(
        &self,
        since: &DateTime<Utc>,
    ) -> Result<Vec<DailyActivityDTO>, Error> {
        let rows = sqlx::query!(
            r#"
            SELECT DATE(created_at) as "day!: NaiveDate", COUNT(*) as "interactions!: i64"
            FROM interactions
            WHERE created_at >= ?
            GROUP BY DATE(created_at)
            ORDER BY DATE(created_at)
            "#,
            since
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DailyActivityDTO {
                date: row.day,
                interactions: row.interactions,
            })
            .collect())
    }

    /// Nuovi circle per giorno, su tutta la storia (la cumulata la fa il service)
    #[instrument(skip(self))]
    pub async fn daily_new_circles(&self) -> Result<Vec<(NaiveDate, i64)>, Error> {
        let rows = sqlx::query!(
            r#"
            SELECT DATE(created_at) as "day!: NaiveDate", COUNT(*) as "created!: i64"
            FROM circles
            GROUP BY DATE(created_at)
            ORDER BY DATE(created_at)
            "#
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows.into_iter().map(|row| (row.day, row.created)).collect())
    }

    /// Nuove membership per giorno, su tutta la storia
    #[instrument(skip(self))]
    pub async fn daily_new_memberships(&self) -> Result<Vec<(NaiveDate, i64)>, Error> {
        let rows = sqlx::query!(
            r#"
            SELECT DATE(created_at) as "day!: NaiveDate", COUNT(*) as "created!: i64"
            FROM circle_memberships
            GROUP BY DATE(created_at)
            ORDER BY DATE(created_at)
            "#
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows.into_iter().map(|row| (row.day, row.created)).collect())
    }

    /// Classifica dei circle per numero di interazioni (decrescente, pari
    /// merito risolto per circle_id crescente)
    #[instrument(skip(self))]
    pub async fn top_circles(&self, limit: i64) -> Result<Vec<TopCircleDTO>, Error> {
        debug!("Ranking circles by interaction count");
        let rows = sqlx::query!(
            r#"
            SELECT
                c.circle_id,
                c.name,
                (SELECT COUNT(*) FROM circle_memberships m
                 WHERE m.circle_id = c.circle_id AND m.user_id IS NOT NULL) as "member_count!: i64",
                (SELECT COUNT(*) FROM interactions i
                 WHERE i.circle_id = c.circle_id) as "interaction_count!: i64"
            FROM circles c
            ORDER BY interaction_count DESC, c.circle_id ASC
            LIMIT ?
            "#,
            limit
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TopCircleDTO {
                circle_id: row.circle_id,
                name: row.name,
                member_count: row.member_count,
                interaction_count: row.interaction_count,
            })
            .collect())
    }

    /// Punti per giorno da `since` in poi: tutti i punti registrati ("given") e
    /// i soli punti con destinatario individuale ("received")
    #[instrument(skip(self))]
    pub async fn daily_point_trends(
        &self,
        since: &DateTime<Utc>,
    ) -> Result<Vec<TrendPointDTO>, Error> {
        let rows = sqlx::query!(
            r#"
            SELECT
                DATE(created_at) as "day!: NaiveDate",
                CAST(COALESCE(SUM(points), 0) AS SIGNED) as "given!: i64",
                CAST(COALESCE(SUM(CASE WHEN receiver_id IS NOT NULL THEN points ELSE 0 END), 0) AS SIGNED) as "received!: i64"
            FROM interactions
            WHERE created_at >= ?
            GROUP BY DATE(created_at)
            ORDER BY DATE(created_at)
            "#,
            since
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| TrendPointDTO {
                date: row.day,
                given: row.given,
                received: row.received,
            })
            .collect())
    }
}
