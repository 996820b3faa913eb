//! Decides whether a caller is the configured administrator.

use crate::domain::user::Caller;

/// The single privileged caller, identified by numeric id or by handle.
/// Matching is exact and case-sensitive; no normalization is applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdminPolicy {
    admin_id: i64,
    admin_handle: String,
}

impl AdminPolicy {
    pub fn new(admin_id: i64, admin_handle: impl Into<String>) -> Self {
        Self { admin_id, admin_handle: admin_handle.into() }
    }

    pub fn is_admin(&self, caller_id: i64, caller_handle: Option<&str>) -> bool {
        if caller_id == self.admin_id {
            return true;
        }
        match caller_handle {
            Some(handle) => !self.admin_handle.is_empty() && handle == self.admin_handle,
            None => false,
        }
    }

    pub fn allows(&self, caller: &Caller) -> bool {
        self.is_admin(caller.tg_id, caller.handle.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::AdminPolicy;

    fn policy() -> AdminPolicy {
        AdminPolicy::new(4242, "ops_lead")
    }

    #[test]
    fn matching_id_is_admin_even_with_different_handle() {
        assert!(policy().is_admin(4242, Some("someone_else")));
        assert!(policy().is_admin(4242, None));
    }

    #[test]
    fn matching_handle_is_admin_even_with_different_id() {
        assert!(policy().is_admin(1, Some("ops_lead")));
    }

    #[test]
    fn handle_match_is_case_sensitive() {
        assert!(!policy().is_admin(1, Some("Ops_Lead")));
        assert!(!policy().is_admin(1, Some("ops_lead ")));
    }

    #[test]
    fn unrelated_caller_is_denied() {
        assert!(!policy().is_admin(7, None));
        assert!(!policy().is_admin(7, Some("worker_bee")));
    }

    #[test]
    fn empty_configured_handle_never_matches() {
        let policy = AdminPolicy::new(4242, "");
        assert!(!policy.is_admin(1, Some("")));
    }
}
