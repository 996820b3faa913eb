use sqlx::Row;

use presence_core::domain::status::StatusCode;
use presence_core::domain::user::{OfficeShare, RosterEntry};

use super::{today, RepositoryError, SetStatusOutcome, StatusRepository};
use crate::DbPool;

pub struct SqlStatusRepository {
    pool: DbPool,
}

impl SqlStatusRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl StatusRepository for SqlStatusRepository {
    async fn set_today(
        &self,
        tg_id: i64,
        code: StatusCode,
    ) -> Result<SetStatusOutcome, RepositoryError> {
        let user_id: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE tg_id = ?")
            .bind(tg_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(user_id) = user_id else {
            return Ok(SetStatusOutcome::UnknownUser);
        };

        let date = today();
        sqlx::query(
            r#"
            INSERT INTO statuses (user_id, date, status)
            VALUES (?, ?, ?)
            ON CONFLICT (user_id, date) DO UPDATE SET status = excluded.status
            "#,
        )
        .bind(user_id)
        .bind(date)
        .bind(code.as_str())
        .execute(&self.pool)
        .await?;

        Ok(SetStatusOutcome::Recorded { date })
    }

    async fn today_for(&self, tg_id: i64) -> Result<Option<String>, RepositoryError> {
        let status = sqlx::query_scalar(
            r#"
            SELECT s.status
            FROM statuses s
            JOIN users u ON s.user_id = u.id
            WHERE u.tg_id = ? AND s.date = ?
            "#,
        )
        .bind(tg_id)
        .bind(today())
        .fetch_optional(&self.pool)
        .await?;

        Ok(status)
    }

    async fn list_today(&self) -> Result<Vec<RosterEntry>, RepositoryError> {
        let rows = sqlx::query(
            r#"
            SELECT u.name, s.status
            FROM statuses s
            JOIN users u ON s.user_id = u.id
            WHERE s.date = ?
            ORDER BY u.name
            "#,
        )
        .bind(today())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| RosterEntry { name: row.get("name"), status: row.get("status") })
            .collect())
    }

    async fn names_with_today(&self, code: StatusCode) -> Result<Vec<String>, RepositoryError> {
        let names = sqlx::query_scalar(
            r#"
            SELECT u.name
            FROM statuses s
            JOIN users u ON s.user_id = u.id
            WHERE s.date = ? AND s.status = ?
            ORDER BY u.name
            "#,
        )
        .bind(today())
        .bind(code.as_str())
        .fetch_all(&self.pool)
        .await?;

        Ok(names)
    }

    async fn office_share_today(&self) -> Result<OfficeShare, RepositoryError> {
        let date = today();
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM statuses WHERE date = ?")
            .bind(date)
            .fetch_one(&self.pool)
            .await?;
        let office: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM statuses WHERE date = ? AND status = ?")
                .bind(date)
                .bind(StatusCode::Office.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(OfficeShare::from_counts(office, total))
    }
}
