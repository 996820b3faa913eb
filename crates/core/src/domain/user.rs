/// Role assigned to a user row created on first contact.
pub const DEFAULT_ROLE: &str = "worker";

/// A registered chat participant as stored in the `users` table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub tg_id: i64,
    pub name: String,
    pub role: String,
}

/// The sender of an inbound message, as seen by handlers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Caller {
    pub tg_id: i64,
    pub handle: Option<String>,
    pub display_name: String,
}

/// One row of the admin's "all statuses today" listing. The status is kept
/// as the raw persisted code so rendering can apply the label fallback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: String,
    pub status: String,
}

/// Today's office headcount relative to everyone who submitted a status.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OfficeShare {
    pub office: i64,
    pub total: i64,
    pub percent: f64,
}

impl OfficeShare {
    /// Percent is office/total rounded to one decimal place; with no
    /// submissions at all it is exactly 0.0, never NaN.
    pub fn from_counts(office: i64, total: i64) -> Self {
        let percent = if total > 0 {
            (office as f64 / total as f64 * 1000.0).round() / 10.0
        } else {
            0.0
        };
        Self { office, total, percent }
    }
}

#[cfg(test)]
mod tests {
    use super::OfficeShare;

    #[test]
    fn zero_submissions_is_exactly_zero() {
        let share = OfficeShare::from_counts(0, 0);
        assert_eq!((share.office, share.total), (0, 0));
        assert_eq!(share.percent, 0.0);
    }

    #[test]
    fn three_of_four_is_seventy_five() {
        assert_eq!(OfficeShare::from_counts(3, 4).percent, 75.0);
    }

    #[test]
    fn percent_rounds_to_one_decimal() {
        assert_eq!(OfficeShare::from_counts(1, 3).percent, 33.3);
        assert_eq!(OfficeShare::from_counts(2, 3).percent, 66.7);
    }
}
