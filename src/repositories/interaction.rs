//! InteractionRepository - Repository per la gestione delle interazioni

use super::{Create, Read};
use crate::dtos::RecordInteractionDTO;
use crate::entities::Interaction;
use chrono::{DateTime, Utc};
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument};

// INTERACTION REPOSITORY
pub struct InteractionRepository {
    connection_pool: MySqlPool,
}

impl InteractionRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Get paginated interactions for a circle
    ///
    /// Supports both:
    /// - Loading recent interactions (when `before_date` is None): gets the most recent `limit` rows
    /// - Loading older interactions (when `before_date` is Some): gets `limit` rows before that date
    ///
    /// # Returns
    /// Interactions ordered from newest to oldest (DESC, by logging time), limited to `limit` count
    #[instrument(skip(self), fields(circle_id = %circle_id))]
    pub async fn find_many_paginated(
        &self,
        circle_id: &i32,
        before_date: Option<&DateTime<Utc>>,
        limit: i64,
    ) -> Result<Vec<Interaction>, Error> {
        debug!("Fetching interaction history");
        let interactions = if let Some(before) = before_date {
            sqlx::query_as!(
                Interaction,
                r#"
                SELECT
                    interaction_id,
                    circle_id,
                    giver_id,
                    receiver_id,
                    description,
                    points,
                    occurred_at,
                    created_at
                FROM interactions
                WHERE circle_id = ?
                  AND created_at < ?
                ORDER BY created_at DESC
                LIMIT ?
                "#,
                circle_id,
                before,
                limit
            )
            .fetch_all(&self.connection_pool)
            .await?
        } else {
            sqlx::query_as!(
                Interaction,
                r#"
                SELECT
                    interaction_id,
                    circle_id,
                    giver_id,
                    receiver_id,
                    description,
                    points,
                    occurred_at,
                    created_at
                FROM interactions
                WHERE circle_id = ?
                ORDER BY created_at DESC
                LIMIT ?
                "#,
                circle_id,
                limit
            )
            .fetch_all(&self.connection_pool)
            .await?
        };

        Ok(interactions)
    }
}

impl Create<Interaction, RecordInteractionDTO> for InteractionRepository {
    #[instrument(skip(self, data), fields(circle_id = %data.circle_id, points = %data.points))]
    async fn create(&self, data: &RecordInteractionDTO) -> Result<Interaction, Error> {
        debug!("Recording interaction");
        let result = sqlx::query!(
            r#"
            INSERT INTO interactions (circle_id, giver_id, receiver_id, description, points, occurred_at)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
            data.circle_id,
            data.giver_id,
            data.receiver_id,
            data.description,
            data.points,
            data.occurred_at
        )
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;

        info!("Interaction recorded with id {}", new_id);

        // Rileggere la riga per avere created_at dal database
        self.read(&new_id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}

impl Read<Interaction, i32> for InteractionRepository {
    #[instrument(skip(self), fields(interaction_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Interaction>, Error> {
        let interaction = sqlx::query_as!(
            Interaction,
            r#"
            SELECT
                interaction_id,
                circle_id,
                giver_id,
                receiver_id,
                description,
                points,
                occurred_at,
                created_at
            FROM interactions
            WHERE interaction_id = ?
            "#,
            id
        )
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(interaction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles", "interactions")))]
    async fn test_create_individual_interaction(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = InteractionRepository::new(pool);

        let created = repo
            .create(&RecordInteractionDTO {
                circle_id: 1,
                giver_id: 3,
                receiver_id: Some(1),
                description: "Watered the plants".to_string(),
                points: 2,
                occurred_at: Utc::now(),
            })
            .await?;

        assert_eq!(created.points, 2);
        assert_eq!(created.receiver_id, Some(1));
        assert!(!created.is_entire_circle());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles", "interactions")))]
    async fn test_create_entire_circle_interaction(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = InteractionRepository::new(pool);

        let created = repo
            .create(&RecordInteractionDTO {
                circle_id: 1,
                giver_id: 2,
                receiver_id: None,
                description: "Cleaned the kitchen".to_string(),
                points: 9, // 3 x 3 membri attivi, moltiplicato dal service
                occurred_at: Utc::now(),
            })
            .await?;

        assert!(created.is_entire_circle());
        assert_eq!(created.points, 9);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles", "interactions")))]
    async fn test_find_many_paginated_newest_first(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = InteractionRepository::new(pool);

        let all = repo.find_many_paginated(&1, None, 50).await?;
        assert_eq!(all.len(), 3);
        // Ordinati per istante di registrazione, non per occurred_at
        assert_eq!(all[0].interaction_id, 3);
        assert_eq!(all[2].interaction_id, 1);

        let limited = repo.find_many_paginated(&1, None, 2).await?;
        assert_eq!(limited.len(), 2);

        let before = repo
            .find_many_paginated(&1, Some(&all[0].created_at), 50)
            .await?;
        assert_eq!(before.len(), 2);

        Ok(())
    }

    /// Il CHECK sui punti rifiuta valori < 1
    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles")))]
    async fn test_create_zero_points_rejected(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = InteractionRepository::new(pool);

        let result = repo
            .create(&RecordInteractionDTO {
                circle_id: 1,
                giver_id: 1,
                receiver_id: None,
                description: "Nothing really".to_string(),
                points: 0,
                occurred_at: Utc::now(),
            })
            .await;

        assert!(result.is_err());

        Ok(())
    }
}
