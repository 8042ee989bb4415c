//! In-process single-flight guard for organization scans.

use crate::ids::OrgId;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// Tracks organizations with a scan in flight.
///
/// A second scan of the same organization is refused while the first
/// one's [`OrgRunPermit`] is alive. Exclusion across processes is left to
/// the scheduler.
#[derive(Debug, Clone, Default)]
pub struct OrgRunGuard {
    active: Arc<Mutex<HashSet<OrgId>>>,
}

impl OrgRunGuard {
    /// Creates a guard with no scans in flight.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims `org_id`, or returns `None` when a scan already holds it.
    #[must_use]
    pub fn try_acquire(&self, org_id: OrgId) -> Option<OrgRunPermit> {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.insert(org_id).then(|| OrgRunPermit {
            org_id,
            active: Arc::clone(&self.active),
        })
    }

    /// Returns `true` while a scan of `org_id` is in flight.
    #[must_use]
    pub fn is_running(&self, org_id: OrgId) -> bool {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&org_id)
    }
}

/// Releases the organization when dropped.
#[derive(Debug)]
pub struct OrgRunPermit {
    org_id: OrgId,
    active: Arc<Mutex<HashSet<OrgId>>>,
}

impl Drop for OrgRunPermit {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.org_id);
    }
}
