use sqlx::Row;

use presence_core::domain::user::User;

use super::{RepositoryError, UserRepository};
use crate::DbPool;

pub struct SqlUserRepository {
    pool: DbPool,
}

impl SqlUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl UserRepository for SqlUserRepository {
    async fn ensure(&self, tg_id: i64, name: &str, role: &str) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO users (tg_id, name, role)
            VALUES (?, ?, ?)
            ON CONFLICT (tg_id) DO NOTHING
            "#,
        )
        .bind(tg_id)
        .bind(name)
        .bind(role)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_tg_id(&self, tg_id: i64) -> Result<Option<User>, RepositoryError> {
        let row = sqlx::query("SELECT id, tg_id, name, role FROM users WHERE tg_id = ?")
            .bind(tg_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| User {
            id: row.get("id"),
            tg_id: row.get("tg_id"),
            name: row.get("name"),
            role: row.get("role"),
        }))
    }
}
