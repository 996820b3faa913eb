//! Gateway-backed implementation of the chat interface's service seam.

use std::sync::Arc;

use async_trait::async_trait;

use presence_core::domain::status::StatusCode;
use presence_core::domain::user::{Caller, OfficeShare, RosterEntry, DEFAULT_ROLE};
use presence_db::repositories::{
    RepositoryError, SetStatusOutcome, StatusRepository, UserRepository,
};
use presence_telegram::commands::{AttendanceService, MarkOutcome, RouteError};

pub struct GatewayAttendanceService {
    users: Arc<dyn UserRepository>,
    statuses: Arc<dyn StatusRepository>,
}

impl GatewayAttendanceService {
    pub fn new(users: Arc<dyn UserRepository>, statuses: Arc<dyn StatusRepository>) -> Self {
        Self { users, statuses }
    }
}

fn service_error(error: RepositoryError) -> RouteError {
    RouteError::Service(error.to_string())
}

#[async_trait]
impl AttendanceService for GatewayAttendanceService {
    async fn register_caller(&self, caller: &Caller) -> Result<(), RouteError> {
        self.users
            .ensure(caller.tg_id, &caller.display_name, DEFAULT_ROLE)
            .await
            .map_err(service_error)
    }

    async fn mark_status(
        &self,
        caller: &Caller,
        code: StatusCode,
    ) -> Result<MarkOutcome, RouteError> {
        // First contact may arrive through a status button rather than
        // /start, so register before writing.
        self.users
            .ensure(caller.tg_id, &caller.display_name, DEFAULT_ROLE)
            .await
            .map_err(service_error)?;

        match self.statuses.set_today(caller.tg_id, code).await.map_err(service_error)? {
            SetStatusOutcome::Recorded { date } => Ok(MarkOutcome::Recorded { date }),
            SetStatusOutcome::UnknownUser => Ok(MarkOutcome::NotRegistered),
        }
    }

    async fn today_status(&self, caller: &Caller) -> Result<Option<String>, RouteError> {
        self.statuses.today_for(caller.tg_id).await.map_err(service_error)
    }

    async fn roster_today(&self) -> Result<Vec<RosterEntry>, RouteError> {
        self.statuses.list_today().await.map_err(service_error)
    }

    async fn office_share(&self) -> Result<OfficeShare, RouteError> {
        self.statuses.office_share_today().await.map_err(service_error)
    }

    async fn names_with_status(&self, code: StatusCode) -> Result<Vec<String>, RouteError> {
        self.statuses.names_with_today(code).await.map_err(service_error)
    }
}
