pub mod access;
pub mod config;
pub mod domain;

pub use access::AdminPolicy;
pub use config::{AppConfig, ConfigError, ConfigOverrides, LoadOptions};
pub use domain::status::{display_label, StatusCode};
pub use domain::user::{Caller, OfficeShare, RosterEntry, User, DEFAULT_ROLE};
