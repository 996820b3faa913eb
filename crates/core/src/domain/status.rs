//! The closed set of daily work statuses and their display labels.
//!
//! The variant order of [`StatusCode::ALL`] is load-bearing: it defines the
//! order status buttons are rendered on the selection keyboards.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusCode {
    Office,
    Remote,
    Vacation,
    Sick,
}

impl StatusCode {
    pub const ALL: [StatusCode; 4] =
        [StatusCode::Office, StatusCode::Remote, StatusCode::Vacation, StatusCode::Sick];

    /// The code persisted in the `statuses` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Office => "office",
            Self::Remote => "remote",
            Self::Vacation => "vacation",
            Self::Sick => "sick",
        }
    }

    /// The label shown on keyboard buttons and in replies.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Office => "In office",
            Self::Remote => "Remote",
            Self::Vacation => "Vacation",
            Self::Sick => "Sick leave",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == code)
    }

    /// Exact label match, no normalization.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.label() == label)
    }
}

/// Renders a persisted code as its label, falling back to the raw code when
/// the code is outside the known set. The fallback is intentional: replies
/// degrade to showing the stored code instead of failing.
pub fn display_label(code: &str) -> &str {
    match StatusCode::from_code(code) {
        Some(status) => status.label(),
        None => code,
    }
}
