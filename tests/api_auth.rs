//! Integration tests per gli endpoints di autenticazione

mod common;

#[cfg(test)]
mod auth_tests {
    use super::common::create_test_server;
    use serde_json::json;
    use sqlx::MySqlPool;

    // ============================================================
    // Test per POST /auth/register - register_user
    // ============================================================

    #[sqlx::test]
    async fn test_register_success(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(pool);

        let response = server
            .post("/auth/register")
            .json(&json!({
                "username": "newuser",
                "password": "supersecret1"
            }))
            .await;

        response.assert_status_ok();
        let user: serde_json::Value = response.json();
        assert_eq!(user["username"], "newuser");
        assert!(user.get("user_id").is_some());
        // L'hash della password non deve mai uscire dal server
        assert!(user.get("password").is_none() || user["password"].is_null());

        Ok(())
    }

    #[sqlx::test(fixtures(path = "../fixtures", scripts("users")))]
    async fn test_register_duplicate_username(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(pool);

        let response = server
            .post("/auth/register")
            .json(&json!({
                "username": "alice",
                "password": "supersecret1"
            }))
            .await;

        response.assert_status_conflict();
        Ok(())
    }

    #[sqlx::test]
    async fn test_register_invalid_username(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(pool);

        // Username con spazi non rispetta il formato ammesso
        let response = server
            .post("/auth/register")
            .json(&json!({
                "username": "not a valid name",
                "password": "supersecret1"
            }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    #[sqlx::test]
    async fn test_register_short_password(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(pool);

        let response = server
            .post("/auth/register")
            .json(&json!({
                "username": "shortpw",
                "password": "abc"
            }))
            .await;

        response.assert_status_bad_request();
        Ok(())
    }

    // ============================================================
    // Test per POST /auth/login - login_user
    // ============================================================

    #[sqlx::test]
    async fn test_login_success_after_register(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(pool);

        server
            .post("/auth/register")
            .json(&json!({
                "username": "loginuser",
                "password": "supersecret1"
            }))
            .await
            .assert_status_ok();

        let response = server
            .post("/auth/login")
            .json(&json!({
                "username": "loginuser",
                "password": "supersecret1"
            }))
            .await;

        response.assert_status_ok();
        let auth_header = response
            .headers()
            .get("authorization")
            .expect("Authorization header must be present");
        assert!(auth_header.to_str().unwrap().starts_with("Bearer "));
        assert!(response.headers().get("set-cookie").is_some());

        Ok(())
    }

    #[sqlx::test]
    async fn test_login_wrong_password(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(pool);

        server
            .post("/auth/register")
            .json(&json!({
                "username": "loginuser",
                "password": "supersecret1"
            }))
            .await
            .assert_status_ok();

        let response = server
            .post("/auth/login")
            .json(&json!({
                "username": "loginuser",
                "password": "wrongpassword"
            }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }

    #[sqlx::test]
    async fn test_login_unknown_user(pool: MySqlPool) -> sqlx::Result<()> {
        let server = create_test_server(pool);

        let response = server
            .post("/auth/login")
            .json(&json!({
                "username": "ghost",
                "password": "whatever123"
            }))
            .await;

        response.assert_status_unauthorized();
        Ok(())
    }
}
