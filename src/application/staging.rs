//! Client-local staging of prospective members during group creation.

use crate::domain::model::{AccountId, AccountProfile};

/// Ordered set of pending members keyed by account id.
///
/// Insertion order is preserved so commits happen in the order the user
/// picked candidates.
#[derive(Debug, Clone, Default)]
pub struct MemberStaging {
    pending: Vec<AccountProfile>,
}

impl MemberStaging {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `candidate` unless an entry with the same id is already staged.
    /// Returns whether the set changed.
    pub fn stage(&mut self, candidate: AccountProfile) -> bool {
        if self.contains(&candidate.id) {
            tracing::debug!("Candidate {} already staged", candidate.id);
            return false;
        }
        self.pending.push(candidate);
        true
    }

    /// Remove the entry with `id`. Returns whether the set changed.
    pub fn unstage(&mut self, id: &AccountId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| &p.id != id);
        self.pending.len() != before
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn contains(&self, id: &AccountId) -> bool {
        self.pending.iter().any(|p| &p.id == id)
    }

    pub fn pending(&self) -> &[AccountProfile] {
        &self.pending
    }

    /// Take the staged members in staging order, leaving the set empty.
    pub fn drain(&mut self) -> Vec<AccountProfile> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> AccountProfile {
        AccountProfile::new(id, format!("{}@x.com", id), None)
    }

    #[test]
    fn test_stage_is_idempotent_by_id() {
        let mut staging = MemberStaging::new();
        assert!(staging.stage(profile("a")));
        assert!(!staging.stage(AccountProfile::new("a", "other@x.com", Some("Other"))));
        assert_eq!(staging.len(), 1);
        assert_eq!(staging.pending()[0].email, "a@x.com");
    }

    #[test]
    fn test_unstage_missing_is_noop() {
        let mut staging = MemberStaging::new();
        staging.stage(profile("a"));
        staging.stage(profile("b"));

        assert!(!staging.unstage(&AccountId::from("zzz")));
        assert_eq!(staging.len(), 2);

        assert!(staging.unstage(&AccountId::from("a")));
        assert_eq!(staging.pending(), &[profile("b")]);
    }

    #[test]
    fn test_preserves_staging_order() {
        let mut staging = MemberStaging::new();
        for id in ["c", "a", "b"] {
            staging.stage(profile(id));
        }
        let ids: Vec<_> = staging.drain().into_iter().map(|p| p.id.0).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert!(staging.is_empty());
    }

    #[test]
    fn test_clear() {
        let mut staging = MemberStaging::new();
        staging.stage(profile("a"));
        staging.clear();
        assert!(staging.is_empty());
    }
}
