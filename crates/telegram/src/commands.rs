use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use presence_core::access::AdminPolicy;
use presence_core::domain::status::StatusCode;
use presence_core::domain::user::{Caller, OfficeShare, RosterEntry};

use crate::replies::{self, Reply};

/// An inbound message reduced to what routing needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IncomingText {
    pub caller: Caller,
    pub text: String,
}

/// The closed set of recognized inputs. Decoding happens once at the
/// boundary so the router can match exhaustively; text that matches nothing
/// becomes `Unrecognized` instead of falling through silently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    MarkStatus,
    SetStatus(StatusCode),
    MyStatus,
    Back,
    AllStatuses,
    OfficePercent,
    FilterMenu,
    FilterByStatus(StatusCode),
    Unrecognized,
}

pub fn decode(text: &str) -> Command {
    let trimmed = text.trim();

    if trimmed == "/start" || trimmed.starts_with("/start@") || trimmed.starts_with("/start ") {
        return Command::Start;
    }

    match trimmed {
        replies::MARK_STATUS => return Command::MarkStatus,
        replies::MY_STATUS => return Command::MyStatus,
        replies::BACK => return Command::Back,
        replies::ALL_STATUSES => return Command::AllStatuses,
        replies::OFFICE_PERCENT => return Command::OfficePercent,
        replies::STATUS_FILTER => return Command::FilterMenu,
        _ => {}
    }

    if let Some(code) = StatusCode::from_label(trimmed) {
        return Command::SetStatus(code);
    }

    if let Some(label) = trimmed.strip_prefix(replies::FILTER_PREFIX) {
        if let Some(code) = StatusCode::from_label(label) {
            return Command::FilterByStatus(code);
        }
    }

    Command::Unrecognized
}

/// Outcome of a status submission as seen by the router.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MarkOutcome {
    Recorded { date: NaiveDate },
    NotRegistered,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("attendance service failed: {0}")]
    Service(String),
}

/// The seam between the chat interface and persistence. Implementations
/// auto-register the caller before a status write, so `NotRegistered` only
/// surfaces when even that fails to produce a user row.
#[async_trait]
pub trait AttendanceService: Send + Sync {
    async fn register_caller(&self, caller: &Caller) -> Result<(), RouteError>;

    async fn mark_status(
        &self,
        caller: &Caller,
        code: StatusCode,
    ) -> Result<MarkOutcome, RouteError>;

    async fn today_status(&self, caller: &Caller) -> Result<Option<String>, RouteError>;

    async fn roster_today(&self) -> Result<Vec<RosterEntry>, RouteError>;

    async fn office_share(&self) -> Result<OfficeShare, RouteError>;

    async fn names_with_status(&self, code: StatusCode) -> Result<Vec<String>, RouteError>;
}

/// Stateless dispatcher: every inbound message produces exactly one reply,
/// and each handler performs at most one service call. Admin-gated commands
/// answer with an explicit denial and never reach the service.
pub struct CommandRouter<S> {
    service: S,
    policy: AdminPolicy,
}

impl<S> CommandRouter<S>
where
    S: AttendanceService,
{
    pub fn new(service: S, policy: AdminPolicy) -> Self {
        Self { service, policy }
    }

    pub async fn route(&self, incoming: &IncomingText) -> Result<Reply, RouteError> {
        let caller = &incoming.caller;
        let is_admin = self.policy.allows(caller);

        match decode(&incoming.text) {
            Command::Start => {
                self.service.register_caller(caller).await?;
                Ok(replies::greeting(is_admin))
            }
            Command::MarkStatus => Ok(replies::status_prompt()),
            Command::SetStatus(code) => match self.service.mark_status(caller, code).await? {
                MarkOutcome::Recorded { date } => Ok(replies::confirmation(code, date)),
                MarkOutcome::NotRegistered => Ok(replies::registration_required()),
            },
            Command::MyStatus => {
                let status = self.service.today_status(caller).await?;
                Ok(replies::my_status(status.as_deref()))
            }
            Command::Back => Ok(replies::greeting(is_admin)),
            Command::AllStatuses => {
                if !is_admin {
                    return Ok(replies::access_denied());
                }
                let entries = self.service.roster_today().await?;
                Ok(replies::roster(&entries))
            }
            Command::OfficePercent => {
                if !is_admin {
                    return Ok(replies::access_denied());
                }
                let share = self.service.office_share().await?;
                Ok(replies::office_share(share))
            }
            Command::FilterMenu => {
                if !is_admin {
                    return Ok(replies::access_denied());
                }
                Ok(replies::filter_prompt())
            }
            Command::FilterByStatus(code) => {
                if !is_admin {
                    return Ok(replies::access_denied());
                }
                let names = self.service.names_with_status(code).await?;
                Ok(replies::filter_result(code, &names))
            }
            Command::Unrecognized => Ok(replies::unknown(is_admin)),
        }
    }
}
