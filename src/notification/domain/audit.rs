//! Audit trail entries.

use crate::ids::{AuditEntryId, OrgId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Immutable record of something that happened to an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    id: AuditEntryId,
    org_id: OrgId,
    actor_user_id: Option<UserId>,
    action: String,
    entity_type: String,
    entity_id: String,
    metadata: Value,
    created_at: DateTime<Utc>,
}

/// Parameter object for reconstructing a persisted audit entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedAuditEntryData {
    /// Persisted identifier.
    pub id: AuditEntryId,
    /// Owning organization.
    pub org_id: OrgId,
    /// Acting user.
    pub actor_user_id: Option<UserId>,
    /// Action name.
    pub action: String,
    /// Entity type.
    pub entity_type: String,
    /// Entity identifier.
    pub entity_id: String,
    /// Metadata payload.
    pub metadata: Value,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Creates a system entry with empty metadata.
    #[must_use]
    pub fn new(
        org_id: OrgId,
        action: impl Into<String>,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AuditEntryId::new(),
            org_id,
            actor_user_id: None,
            action: action.into(),
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            metadata: Value::Object(serde_json::Map::new()),
            created_at,
        }
    }

    /// Attributes the entry to a user.
    #[must_use]
    pub const fn with_actor(mut self, actor_user_id: Option<UserId>) -> Self {
        self.actor_user_id = actor_user_id;
        self
    }

    /// Sets the metadata payload.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = metadata;
        self
    }

    /// Reconstructs an entry from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedAuditEntryData) -> Self {
        Self {
            id: data.id,
            org_id: data.org_id,
            actor_user_id: data.actor_user_id,
            action: data.action,
            entity_type: data.entity_type,
            entity_id: data.entity_id,
            metadata: data.metadata,
            created_at: data.created_at,
        }
    }

    /// Returns the entry identifier.
    #[must_use]
    pub const fn id(&self) -> AuditEntryId {
        self.id
    }

    /// Returns the owning organization.
    #[must_use]
    pub const fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the acting user.
    #[must_use]
    pub const fn actor_user_id(&self) -> Option<UserId> {
        self.actor_user_id
    }

    /// Returns the action name.
    #[must_use]
    pub fn action(&self) -> &str {
        &self.action
    }

    /// Returns the entity type.
    #[must_use]
    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// Returns the entity identifier.
    #[must_use]
    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    /// Returns the metadata payload.
    #[must_use]
    pub const fn metadata(&self) -> &Value {
        &self.metadata
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
