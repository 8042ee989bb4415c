//! Process-local database shared by the in-memory adapters.
//!
//! Every in-memory adapter holds a clone of the same [`InMemoryDatabase`], so
//! the assignment unit of work can update rule cursors and tickets under one
//! lock, mirroring a database transaction.

use super::PersistenceError;
use crate::assignment::domain::AutoAssignRule;
use crate::directory::domain::{Member, Organization, Team};
use crate::ids::{JobRunId, MemberId, OrgId, RuleId, TeamId, TicketId, WorkflowRunId};
use crate::ledger::domain::{JobRun, WorkflowRun};
use crate::notification::domain::{AuditEntry, Notification, QueuedEmail};
use crate::ticket::domain::{SlaRule, Ticket, TicketPriority};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Shared handle to the in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    tables: Arc<RwLock<Tables>>,
}

/// Table set backing the in-memory adapters.
#[derive(Debug, Default)]
pub(crate) struct Tables {
    pub(crate) organizations: HashMap<OrgId, Organization>,
    pub(crate) members: HashMap<MemberId, Member>,
    pub(crate) teams: HashMap<TeamId, Team>,
    pub(crate) team_members: BTreeSet<(TeamId, MemberId)>,
    pub(crate) tickets: HashMap<TicketId, Ticket>,
    pub(crate) sla_rules: HashMap<(OrgId, TicketPriority), SlaRule>,
    pub(crate) assign_rules: HashMap<RuleId, AutoAssignRule>,
    pub(crate) workflow_runs: HashMap<WorkflowRunId, WorkflowRun>,
    pub(crate) job_runs: HashMap<JobRunId, JobRun>,
    pub(crate) notifications: Vec<Notification>,
    pub(crate) audit_log: Vec<AuditEntry>,
    pub(crate) email_queue: Vec<QueuedEmail>,
}

impl InMemoryDatabase {
    /// Creates an empty database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires a shared read guard, mapping poisoning into `E`.
    pub(crate) fn read<E: PersistenceError>(&self) -> Result<RwLockReadGuard<'_, Tables>, E> {
        self.tables
            .read()
            .map_err(|err| E::persistence(std::io::Error::other(err.to_string())))
    }

    /// Acquires an exclusive write guard, mapping poisoning into `E`.
    pub(crate) fn write<E: PersistenceError>(&self) -> Result<RwLockWriteGuard<'_, Tables>, E> {
        self.tables
            .write()
            .map_err(|err| E::persistence(std::io::Error::other(err.to_string())))
    }
}

/// Truncates a sorted result set to at most `limit` rows.
pub(crate) fn take_limit<T>(mut rows: Vec<T>, limit: usize) -> Vec<T> {
    rows.truncate(limit);
    rows
}
