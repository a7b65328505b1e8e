//! CircleRepository - Repository per la gestione dei circle

use super::{Read, Update};
use crate::dtos::{CreateCircleDTO, UpdateCircleDTO};
use crate::entities::{Circle, User};
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument};

// CIRCLE REPOSITORY
pub struct CircleRepository {
    connection_pool: MySqlPool,
}

impl CircleRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Resolve an invite code to its circle (invite codes are unique)
    #[instrument(skip(self, invite_code))]
    pub async fn find_by_invite_code(&self, invite_code: &str) -> Result<Option<Circle>, Error> {
        debug!("Resolving invite code");
        let circle = sqlx::query_as!(
            Circle,
            r#"
            SELECT circle_id, name, description, invite_code, created_by, created_at
            FROM circles
            WHERE invite_code = ?
            "#,
            invite_code
        )
        .fetch_optional(&self.connection_pool)
        .await?;

        if circle.is_some() {
            debug!("Invite code resolved");
        } else {
            debug!("Invite code not found");
        }

        Ok(circle)
    }

    /// Crea il circle, la membership attiva del creatore e le membership
    /// pending per i nomi indicati, tutto in una sola transazione: o esiste
    /// il circle completo o non esiste niente (mai un circle orfano).
    #[instrument(skip(self, data, creator), fields(name = %data.name, creator_id = %creator.user_id))]
    pub async fn create_with_memberships(
        &self,
        data: &CreateCircleDTO,
        invite_code: &str,
        creator: &User,
    ) -> Result<Circle, Error> {
        debug!("Creating circle with memberships in a single transaction");
        let mut tx = self.connection_pool.begin().await?;

        let result = sqlx::query!(
            r#"
            INSERT INTO circles (name, description, invite_code, created_by)
            VALUES (?, ?, ?, ?)
            "#,
            data.name,
            data.description,
            invite_code,
            creator.user_id
        )
        .execute(&mut *tx)
        .await?;

        let circle_id = result.last_insert_id() as i32;

        // Membership attiva del creatore
        sqlx::query!(
            r#"
            INSERT INTO circle_memberships (circle_id, user_id, display_name, joined_at)
            VALUES (?, ?, ?, NOW())
            "#,
            circle_id,
            creator.user_id,
            creator.username
        )
        .execute(&mut *tx)
        .await?;

        // Una riga pending (user_id NULL, joined_at NULL) per ogni nome indicato
        for name in &data.pending_member_names {
            sqlx::query!(
                r#"
                INSERT INTO circle_memberships (circle_id, user_id, display_name, joined_at)
                VALUES (?, NULL, ?, NULL)
                "#,
                circle_id,
                name
            )
            .execute(&mut *tx)
            .await?;
        }

        // Rileggere la riga dentro la transazione per avere created_at dal database
        let circle = sqlx::query_as!(
            Circle,
            r#"
            SELECT circle_id, name, description, invite_code, created_by, created_at
            FROM circles
            WHERE circle_id = ?
            "#,
            circle_id
        )
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            "Circle created with id {} and {} pending members",
            circle_id,
            data.pending_member_names.len()
        );

        Ok(circle)
    }
}

impl Read<Circle, i32> for CircleRepository {
    #[instrument(skip(self), fields(circle_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Circle>, Error> {
        debug!("Reading circle by id");
        let circle = sqlx::query_as!(
            Circle,
            r#"
            SELECT circle_id, name, description, invite_code, created_by, created_at
            FROM circles
            WHERE circle_id = ?
            "#,
            id
        )
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(circle)
    }
}

impl Update<Circle, UpdateCircleDTO, i32> for CircleRepository {
    #[instrument(skip(self, data), fields(circle_id = %id))]
    async fn update(&self, id: &i32, data: &UpdateCircleDTO) -> Result<Circle, Error> {
        debug!("Updating circle");
        // First, get the current circle to ensure it exists
        let current_circle = self
            .read(id)
            .await?
            .ok_or_else(|| sqlx::Error::RowNotFound)?;

        // If no fields to update, return current circle
        if data.name.is_none() && data.description.is_none() {
            debug!("No fields to update, returning current circle");
            return Ok(current_circle);
        }

        // Build dynamic UPDATE query using QueryBuilder (idiomatic SQLx way)
        let mut query_builder = sqlx::QueryBuilder::new("UPDATE circles SET ");

        let mut separated = query_builder.separated(", ");
        if let Some(ref name) = data.name {
            separated.push("name = ");
            separated.push_bind_unseparated(name);
        }
        if let Some(ref description) = data.description {
            separated.push("description = ");
            separated.push_bind_unseparated(description);
        }

        query_builder.push(" WHERE circle_id = ");
        query_builder.push_bind(id);

        query_builder.build().execute(&self.connection_pool).await?;

        info!("Circle updated successfully");

        // Fetch and return the updated circle
        self.read(id).await?.ok_or_else(|| sqlx::Error::RowNotFound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_create(names: Vec<&str>) -> CreateCircleDTO {
        CreateCircleDTO {
            name: "Book Club".to_string(),
            description: Some("Monthly reads".to_string()),
            pending_member_names: names.into_iter().map(String::from).collect(),
            invite_emails: vec![],
        }
    }

    async fn creator(pool: &MySqlPool) -> User {
        sqlx::query_as!(
            User,
            "SELECT user_id, username, password FROM users WHERE user_id = 1"
        )
        .fetch_one(pool)
        .await
        .expect("fixture user")
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_create_with_memberships(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = CircleRepository::new(pool.clone());
        let alice = creator(&pool).await;

        let circle = repo
            .create_with_memberships(&sample_create(vec!["Sarah", "Mike"]), "bookcode", &alice)
            .await?;

        assert_eq!(circle.name, "Book Club");
        assert_eq!(circle.created_by, 1);
        assert_eq!(circle.invite_code, "bookcode");

        // Il creatore è attivo, i nominati sono pending
        let active = sqlx::query!(
            "SELECT COUNT(*) as count FROM circle_memberships WHERE circle_id = ? AND user_id IS NOT NULL",
            circle.circle_id
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(active.count, 1);

        let pending = sqlx::query!(
            "SELECT COUNT(*) as count FROM circle_memberships WHERE circle_id = ? AND user_id IS NULL",
            circle.circle_id
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(pending.count, 2);

        Ok(())
    }

    /// Invite code già usato: la transazione deve fallire senza lasciare
    /// né il circle né alcuna membership
    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles")))]
    async fn test_create_duplicate_invite_code_rolls_back(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = CircleRepository::new(pool.clone());
        let alice = creator(&pool).await;

        let result = repo
            .create_with_memberships(&sample_create(vec!["Sarah"]), "flatcode1", &alice)
            .await;
        assert!(result.is_err());

        let circles = sqlx::query!("SELECT COUNT(*) as count FROM circles")
            .fetch_one(&pool)
            .await?;
        assert_eq!(circles.count, 2, "no orphan circle should be left behind");

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles")))]
    async fn test_find_by_invite_code(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = CircleRepository::new(pool);

        let found = repo.find_by_invite_code("flatcode1").await?;
        assert_eq!(found.unwrap().name, "Flatmates");

        let missing = repo.find_by_invite_code("nosuchcode").await?;
        assert!(missing.is_none());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users", "circles")))]
    async fn test_update_partial_fields(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = CircleRepository::new(pool);

        let updated = repo
            .update(
                &1,
                &UpdateCircleDTO {
                    name: Some("Flatmates 2.0".to_string()),
                    description: None,
                },
            )
            .await?;

        assert_eq!(updated.name, "Flatmates 2.0");
        // La descrizione non toccata resta quella del fixture
        assert_eq!(updated.description.as_deref(), Some("Chores and favours"));

        Ok(())
    }
}
