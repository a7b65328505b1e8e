//! UserRepository - Repository per la gestione degli utenti

use super::{Create, Read};
use crate::dtos::CreateUserDTO;
use crate::entities::User;
use sqlx::{Error, MySqlPool};
use tracing::{debug, instrument};

// USER REPOSITORY
pub struct UserRepository {
    connection_pool: MySqlPool,
}

impl UserRepository {
    pub fn new(connection_pool: MySqlPool) -> Self {
        Self { connection_pool }
    }

    ///considero l'username univoco
    /// Find user by exact username match
    #[instrument(skip(self))]
    pub async fn find_by_username(&self, username: &String) -> Result<Option<User>, Error> {
        debug!("Finding user by username");
        let user = sqlx::query_as!(
            User,
            "SELECT user_id, username, password FROM users WHERE username = ?",
            username
        )
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

impl Create<User, CreateUserDTO> for UserRepository {
    #[instrument(skip(self, data), fields(username = %data.username))]
    async fn create(&self, data: &CreateUserDTO) -> Result<User, Error> {
        debug!("Creating new user");
        let result = sqlx::query!(
            "INSERT INTO users (username, password) VALUES (?, ?)",
            data.username,
            data.password
        )
        .execute(&self.connection_pool)
        .await?;

        // Get the last inserted ID
        let new_id = result.last_insert_id() as i32;

        Ok(User {
            user_id: new_id,
            username: data.username.clone(),
            password: data.password.clone(),
        })
    }
}

impl Read<User, i32> for UserRepository {
    #[instrument(skip(self), fields(user_id = %id))]
    async fn read(&self, id: &i32) -> Result<Option<User>, Error> {
        let user = sqlx::query_as!(
            User,
            "SELECT user_id, username, password FROM users WHERE user_id = ?",
            id
        )
        .fetch_optional(&self.connection_pool)
        .await?;

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_find_by_username_existing(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);

        let user = repo.find_by_username(&"alice".to_string()).await?;

        assert!(user.is_some());
        assert_eq!(user.unwrap().user_id, 1);

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_find_by_username_missing(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);

        let user = repo.find_by_username(&"nonexistent".to_string()).await?;

        assert!(user.is_none());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_create_assigns_id(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);

        let created = repo
            .create(&CreateUserDTO {
                username: "eve".to_string(),
                password: "hashed-password".to_string(),
            })
            .await?;

        assert!(created.user_id > 4);
        let read_back = repo.read(&created.user_id).await?;
        assert_eq!(read_back.unwrap().username, "eve");

        Ok(())
    }

    /// Username duplicato: la UNIQUE deve rifiutare l'insert
    #[sqlx::test(fixtures(path = "../../fixtures", scripts("users")))]
    async fn test_create_duplicate_username_fails(pool: MySqlPool) -> sqlx::Result<()> {
        let repo = UserRepository::new(pool);

        let result = repo
            .create(&CreateUserDTO {
                username: "alice".to_string(),
                password: "hashed-password".to_string(),
            })
            .await;

        assert!(result.is_err());

        Ok(())
    }
}
