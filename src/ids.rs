//! UUID-backed identifier newtypes shared across bounded contexts.
//!
//! Each identifier wraps a [`Uuid`] so that organization, user, ticket, and
//! ledger identifiers cannot be mixed up at call sites. Ordering follows the
//! UUID byte order, which matches the lexical order of the hyphenated form
//! and is what the assignment rotation ring relies on.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Creates an identifier from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the wrapped UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl AsRef<Uuid> for $name {
            fn as_ref(&self) -> &Uuid {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

uuid_identifier!(
    /// Tenant organization identifier.
    OrgId
);
uuid_identifier!(
    /// Platform user identifier (requesters, agents, watchers).
    UserId
);
uuid_identifier!(
    /// Organization membership identifier; the rotation ring is keyed on it.
    MemberId
);
uuid_identifier!(
    /// Team identifier.
    TeamId
);
uuid_identifier!(
    /// Ticket category identifier.
    CategoryId
);
uuid_identifier!(
    /// Ticket identifier.
    TicketId
);
uuid_identifier!(
    /// Auto-assign rule identifier.
    RuleId
);
uuid_identifier!(
    /// Workflow run ledger identifier.
    WorkflowRunId
);
uuid_identifier!(
    /// Job run ledger identifier.
    JobRunId
);
uuid_identifier!(
    /// In-app notification identifier.
    NotificationId
);
uuid_identifier!(
    /// Audit log entry identifier.
    AuditEntryId
);
uuid_identifier!(
    /// Queued email identifier.
    EmailId
);
