use async_trait::async_trait;
use tracing::error;

use super::MySqlStore;
use crate::error::AppResult;
use crate::model::user::{RefreshTokenRecord, User};
use crate::repository::UserRepository;

#[async_trait]
impl UserRepository for MySqlStore {
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, password, role_id, employee_id
            FROM users
            WHERE username = ?
            "#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn touch_last_login(&self, user_id: u64) -> AppResult<()> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(error = %e, user_id, "Failed to update last_login_at");
                e
            })?;
        Ok(())
    }

    async fn store_refresh_token(&self, user_id: u64, jti: &str, expires_at: i64) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, jti, expires_at)
            VALUES (?, ?, FROM_UNIXTIME(?))
            "#,
        )
        .bind(user_id)
        .bind(jti)
        .bind(expires_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_refresh_token(&self, jti: &str) -> AppResult<Option<RefreshTokenRecord>> {
        let record = sqlx::query_as::<_, RefreshTokenRecord>(
            r#"
            SELECT id, user_id, revoked
            FROM refresh_tokens
            WHERE jti = ?
            "#,
        )
        .bind(jti)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn revoke_refresh_token(&self, jti: &str) -> AppResult<bool> {
        let result = sqlx::query("UPDATE refresh_tokens SET revoked = TRUE WHERE jti = ? AND revoked = FALSE")
            .bind(jti)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
