use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use presence_core::domain::status::StatusCode;
use presence_core::domain::user::{OfficeShare, RosterEntry, User};

pub mod status;
pub mod user;

pub use status::SqlStatusRepository;
pub use user::SqlUserRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Result of a status submission. `UnknownUser` is a defined signal, not an
/// error: the caller has no `users` row yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SetStatusOutcome {
    Recorded { date: NaiveDate },
    UnknownUser,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert-if-absent keyed by chat id; a no-op when the row exists.
    async fn ensure(&self, tg_id: i64, name: &str, role: &str) -> Result<(), RepositoryError>;

    async fn find_by_tg_id(&self, tg_id: i64) -> Result<Option<User>, RepositoryError>;
}

#[async_trait]
pub trait StatusRepository: Send + Sync {
    /// Upserts today's entry for the caller. A same-day resubmission
    /// overwrites the prior row; the unique (user_id, date) constraint
    /// guarantees a single row even under concurrent submissions.
    async fn set_today(
        &self,
        tg_id: i64,
        code: StatusCode,
    ) -> Result<SetStatusOutcome, RepositoryError>;

    /// `None` means "not yet submitted today", distinct from an error.
    async fn today_for(&self, tg_id: i64) -> Result<Option<String>, RepositoryError>;

    /// Everyone who submitted today, ordered by name ascending. Empty when
    /// nobody has.
    async fn list_today(&self) -> Result<Vec<RosterEntry>, RepositoryError>;

    async fn names_with_today(&self, code: StatusCode) -> Result<Vec<String>, RepositoryError>;

    async fn office_share_today(&self) -> Result<OfficeShare, RepositoryError>;
}

pub(crate) fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}
