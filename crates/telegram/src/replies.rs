//! Menu keyboards and canned reply texts.
//!
//! Button labels double as routing keys: `commands::decode` matches inbound
//! text against the exact strings defined here.

use chrono::NaiveDate;

use presence_core::domain::status::{display_label, StatusCode};
use presence_core::domain::user::{OfficeShare, RosterEntry};

use crate::api::ReplyKeyboardMarkup;

pub const MARK_STATUS: &str = "Mark status";
pub const MY_STATUS: &str = "My status";
pub const ALL_STATUSES: &str = "All statuses";
pub const OFFICE_PERCENT: &str = "Office percent";
pub const STATUS_FILTER: &str = "Status filter";
pub const BACK: &str = "Back";

/// Filter buttons carry this prefix so a filter selection can never be
/// mistaken for a self-report.
pub const FILTER_PREFIX: &str = "Filter: ";

/// One outbound chat message: text plus an optional reply keyboard.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<ReplyKeyboardMarkup>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self { text: text.into(), keyboard: None }
    }

    pub fn with_keyboard(text: impl Into<String>, keyboard: ReplyKeyboardMarkup) -> Self {
        Self { text: text.into(), keyboard: Some(keyboard) }
    }
}

pub fn employee_menu() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup::single_column([MARK_STATUS, MY_STATUS])
}

pub fn admin_menu() -> ReplyKeyboardMarkup {
    ReplyKeyboardMarkup::single_column([ALL_STATUSES, OFFICE_PERCENT, STATUS_FILTER])
}

pub fn status_menu() -> ReplyKeyboardMarkup {
    let labels = StatusCode::ALL.iter().map(|status| status.label()).chain([BACK]);
    ReplyKeyboardMarkup::single_column(labels)
}

pub fn filter_menu() -> ReplyKeyboardMarkup {
    let labels = StatusCode::ALL
        .iter()
        .map(|status| format!("{FILTER_PREFIX}{}", status.label()))
        .chain([BACK.to_string()]);
    ReplyKeyboardMarkup::single_column(labels)
}

fn menu_for(is_admin: bool) -> ReplyKeyboardMarkup {
    if is_admin {
        admin_menu()
    } else {
        employee_menu()
    }
}

pub fn greeting(is_admin: bool) -> Reply {
    if is_admin {
        Reply::with_keyboard("Welcome, administrator.", admin_menu())
    } else {
        Reply::with_keyboard("Hi! Pick an action:", employee_menu())
    }
}

pub fn status_prompt() -> Reply {
    Reply::with_keyboard("Pick your work status for today:", status_menu())
}

pub fn filter_prompt() -> Reply {
    Reply::with_keyboard("Pick a status to filter by:", filter_menu())
}

pub fn confirmation(code: StatusCode, date: NaiveDate) -> Reply {
    Reply::with_keyboard(
        format!("Status \"{}\" recorded\n{date}", code.label()),
        employee_menu(),
    )
}

pub fn my_status(status: Option<&str>) -> Reply {
    match status {
        Some(code) => Reply::text(format!("Your status today: {}", display_label(code))),
        None => Reply::text("You have not marked a status today yet."),
    }
}

pub fn roster(entries: &[RosterEntry]) -> Reply {
    if entries.is_empty() {
        return Reply::text("No statuses for today yet.");
    }
    let lines: Vec<String> = entries
        .iter()
        .map(|entry| format!("{}: {}", entry.name, display_label(&entry.status)))
        .collect();
    Reply::text(lines.join("\n"))
}

pub fn office_share(share: OfficeShare) -> Reply {
    Reply::text(format!("In office: {}/{} ({}%)", share.office, share.total, share.percent))
}

pub fn filter_result(code: StatusCode, names: &[String]) -> Reply {
    if names.is_empty() {
        return Reply::text(format!("Nobody is \"{}\" today.", code.label()));
    }
    Reply::text(format!("{}:\n{}", code.label(), names.join("\n")))
}

pub fn access_denied() -> Reply {
    Reply::text("Access denied.")
}

pub fn registration_required() -> Reply {
    Reply::text("You are not registered yet. Send /start first.")
}

pub fn failure() -> Reply {
    Reply::text("Something went wrong. Please try again.")
}

pub fn unknown(is_admin: bool) -> Reply {
    Reply::with_keyboard("Unknown action. Pick an option from the menu.", menu_for(is_admin))
}

#[cfg(test)]
mod tests {
    use presence_core::domain::user::{OfficeShare, RosterEntry};

    use super::{
        filter_menu, greeting, my_status, office_share, roster, status_menu, BACK, FILTER_PREFIX,
    };

    fn button_labels(markup: &crate::api::ReplyKeyboardMarkup) -> Vec<String> {
        markup.keyboard.iter().map(|row| row[0].text.clone()).collect()
    }

    #[test]
    fn status_menu_lists_labels_in_registry_order_plus_back() {
        let labels = button_labels(&status_menu());
        assert_eq!(labels, vec!["In office", "Remote", "Vacation", "Sick leave", BACK]);
    }

    #[test]
    fn filter_menu_buttons_are_prefixed() {
        let labels = button_labels(&filter_menu());
        assert_eq!(labels.len(), 5);
        assert!(labels[..4].iter().all(|label| label.starts_with(FILTER_PREFIX)));
        assert_eq!(labels[4], BACK);
    }

    #[test]
    fn greeting_menu_depends_on_role() {
        let admin = greeting(true);
        assert!(admin.text.contains("administrator"));
        assert_eq!(button_labels(admin.keyboard.as_ref().expect("keyboard")).len(), 3);

        let employee = greeting(false);
        assert_eq!(button_labels(employee.keyboard.as_ref().expect("keyboard")).len(), 2);
    }

    #[test]
    fn roster_joins_lines_and_applies_label_fallback() {
        let entries = vec![
            RosterEntry { name: "Avery".to_string(), status: "office".to_string() },
            RosterEntry { name: "Blake".to_string(), status: "sabbatical".to_string() },
        ];
        assert_eq!(roster(&entries).text, "Avery: In office\nBlake: sabbatical");
    }

    #[test]
    fn empty_roster_reports_no_data() {
        assert_eq!(roster(&[]).text, "No statuses for today yet.");
    }

    #[test]
    fn my_status_renders_label_or_not_set() {
        assert_eq!(my_status(Some("remote")).text, "Your status today: Remote");
        assert_eq!(my_status(None).text, "You have not marked a status today yet.");
    }

    #[test]
    fn office_share_renders_counts_and_percent() {
        let reply = office_share(OfficeShare::from_counts(3, 4));
        assert_eq!(reply.text, "In office: 3/4 (75%)");
    }

    #[test]
    fn office_share_keeps_fractional_percent() {
        let reply = office_share(OfficeShare::from_counts(1, 3));
        assert_eq!(reply.text, "In office: 1/3 (33.3%)");
    }
}
