//! MembershipRepository - Repository per la gestione delle membership

use super::{Create, Delete, Read};
use crate::dtos::CreateMembershipDTO;
use crate::entities::Membership;
use sqlx::{Error, MySqlPool};
use tracing::{debug, info, instrument};

// MEMBERSHIP REPOSITORY
pub struct MembershipRepository {
    connection_pool: MySqlPool,
}

impl MembershipRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    /// Membership attiva di un utente in un circle (al più una, per UNIQUE)
    #[instrument(skip(self), fields(circle_id = %circle_id, user_id = %user_id))]
    pub async fn find_active(
        &self,
        circle_id: &i32,
        user_id: &i32,
    ) -> Result<Option<Membership>, Error> {
        debug!("Finding active membership");
        let membership = sqlx::query_as!(
            Membership,
            r#"
            SELECT membership_id, circle_id, user_id, display_name, joined_at, created_at
            FROM circle_memberships
            WHERE circle_id = ? AND user_id = ?
            "#,
            circle_id,
            user_id
        )
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(membership)
    }

    /// Tutte le membership di un circle, attive e pending
    #[instrument(skip(self), fields(circle_id = %circle_id))]
    pub async fn find_many_by_circle_id(&self, circle_id: &i32) -> Result<Vec<Membership>, Error> {
        debug!("Listing memberships for circle");
        let memberships = sqlx::query_as!(
            Membership,
            r#"
            SELECT membership_id, circle_id, user_id, display_name, joined_at, created_at
            FROM circle_memberships
            WHERE circle_id = ?
            ORDER BY created_at, membership_id
            "#,
            circle_id
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(memberships)
    }

    /// Le membership attive di un utente, ordinate per data di join
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn find_many_by_user_id(&self, user_id: &i32) -> Result<Vec<Membership>, Error> {
        debug!("Listing memberships for user");
        let memberships = sqlx::query_as!(
            Membership,
            r#"
            SELECT membership_id, circle_id, user_id, display_name, joined_at, created_at
            FROM circle_memberships
            WHERE user_id = ?
            ORDER BY joined_at, membership_id
            "#,
            user_id
        )
        .fetch_all(&self.connection_pool)
        .await?;

        Ok(memberships)
    }

    /// Numero di membri attivi di un circle, letto fresco: è il moltiplicatore
    /// dello scoring "entire circle"
    #[instrument(skip(self), fields(circle_id = %circle_id))]
    pub async fn count_active(&self, circle_id: &i32) -> Result<i64, Error> {
        let row = sqlx::query!(
            "SELECT COUNT(*) as count FROM circle_memberships WHERE circle_id = ? AND user_id IS NOT NULL",
            circle_id
        )
        .fetch_one(&self.connection_pool)
        .await?;

        Ok(row.count)
    }
}

impl Create<Membership, CreateMembershipDTO> for MembershipRepository {
    #[instrument(skip(self, data), fields(circle_id = %data.circle_id))]
    async fn create(&self, data: &CreateMembershipDTO) -> Result<Membership, Error> {
        debug!("Creating membership");
        let result = sqlx::query!(
            r#"
            INSERT INTO circle_memberships (circle_id, user_id, display_name, joined_at)
            VALUES (?, ?, ?, ?)
            "#,
            data.circle_id,
            data.user_id,
            data.display_name,
            data.joined_at
        )
        .execute(&self.connection_pool)
        .await?;

        let new_id = result.last_insert_id() as i32;

        info!("Membership created with id {}", new_id);

        // Rileggere la riga per avere created_at dal database
        self.read(&new_id).await?.ok_or(sqlx::Error::RowNotFound)
    }
}

impl Read<Membership, i32> for MembershipRepository {
    #[instrument(skip(self), fields(membership_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<Membership>, Error> {
        let membership = sqlx::query_as!(
            Membership,
            r#"
            SELECT membership_id, circle_id, user_id, display_name, joined_at, created_at
            FROM circle_memberships
            WHERE membership_id = ?
            "#,
            id
        )
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(membership)
    }
}

impl Delete<i32> for MembershipRepository {
    #[instrument(skip(self), fields(membership_id = %id))]
    async fn delete(&self, id: &i32) -> Result<(), Error> {
        debug!("Deleting membership");
        sqlx::query!(
            "DELETE FROM circle_memberships WHERE membership_id = ?",
            id
        )
        .execute(&self.connection_pool)
        .await?;

        info!("Membership deleted successfully");
        Ok(())
    }
}
