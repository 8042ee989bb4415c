//! Diesel schema for the service desk automation tables.

diesel::table! {
    /// Tenant organizations.
    organizations (id) {
        /// Organization identifier.
        id -> Uuid,
        /// URL-safe slug used to build ticket keys.
        #[max_length = 64]
        slug -> Varchar,
        /// Display name.
        #[max_length = 255]
        name -> Varchar,
        /// Next sequential ticket number to hand out.
        next_ticket_number -> Int8,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Organization memberships with roles.
    members (id) {
        /// Membership identifier.
        id -> Uuid,
        /// Owning organization.
        org_id -> Uuid,
        /// Platform user identifier.
        user_id -> Uuid,
        /// Membership role.
        #[max_length = 32]
        role -> Varchar,
    }
}

diesel::table! {
    /// Teams within an organization.
    teams (id) {
        /// Team identifier.
        id -> Uuid,
        /// Owning organization.
        org_id -> Uuid,
        /// Team name.
        #[max_length = 255]
        name -> Varchar,
    }
}

diesel::table! {
    /// Team membership join table.
    team_members (team_id, member_id) {
        /// Team identifier.
        team_id -> Uuid,
        /// Membership identifier.
        member_id -> Uuid,
    }
}

diesel::table! {
    /// Service desk tickets.
    tickets (id) {
        /// Ticket identifier.
        id -> Uuid,
        /// Owning organization.
        org_id -> Uuid,
        /// Sequential per-organization number.
        number -> Int8,
        /// Human-readable key such as `ACME-42`.
        #[max_length = 80]
        key -> Varchar,
        /// Ticket title.
        #[max_length = 255]
        title -> Varchar,
        /// Ticket description.
        description -> Text,
        /// Lifecycle status.
        #[max_length = 32]
        status -> Varchar,
        /// Priority.
        #[max_length = 32]
        priority -> Varchar,
        /// Requesting user.
        requester_id -> Uuid,
        /// Assigned agent user.
        assignee_id -> Nullable<Uuid>,
        /// Assigned team.
        team_id -> Nullable<Uuid>,
        /// Ticket category.
        category_id -> Nullable<Uuid>,
        /// SLA due timestamp.
        due_at -> Nullable<Timestamptz>,
        /// At-risk flag.
        at_risk -> Bool,
        /// First breach timestamp.
        breached_at -> Nullable<Timestamptz>,
        /// Resolution timestamp.
        resolved_at -> Nullable<Timestamptz>,
        /// Closure timestamp.
        closed_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last update timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Users watching a ticket, in the order they were added.
    ticket_watchers (ticket_id, user_id) {
        /// Ticket identifier.
        ticket_id -> Uuid,
        /// Watching user.
        user_id -> Uuid,
        /// Insertion order within the ticket.
        position -> Int4,
    }
}

diesel::table! {
    /// SLA targets per organization and priority.
    sla_rules (org_id, priority) {
        /// Owning organization.
        org_id -> Uuid,
        /// Ticket priority the rule applies to.
        #[max_length = 32]
        priority -> Varchar,
        /// First-response target in minutes.
        response_minutes -> Int4,
        /// Resolution target in minutes.
        resolution_minutes -> Int4,
    }
}

diesel::table! {
    /// Auto-assign rules with their round-robin cursor.
    auto_assign_rules (id) {
        /// Rule identifier.
        id -> Uuid,
        /// Owning organization.
        org_id -> Uuid,
        /// Rule name.
        #[max_length = 255]
        name -> Varchar,
        /// Category filter; null matches every category.
        category_id -> Nullable<Uuid>,
        /// Target team.
        team_id -> Nullable<Uuid>,
        /// Assignment strategy.
        #[max_length = 32]
        strategy -> Varchar,
        /// Whether the rule participates in matching.
        is_active -> Bool,
        /// Member picked by the last round-robin assignment.
        last_assigned_member_id -> Nullable<Uuid>,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Last configuration change timestamp.
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Workflow automation run ledger.
    workflow_runs (id) {
        /// Run identifier.
        id -> Uuid,
        /// Organization scanned by the run.
        org_id -> Nullable<Uuid>,
        /// Manual or scheduled trigger.
        #[max_length = 32]
        run_type -> Varchar,
        /// Run status.
        #[max_length = 32]
        status -> Varchar,
        /// Summary payload.
        summary -> Nullable<Jsonb>,
        /// Triggering user.
        triggered_by -> Nullable<Uuid>,
        /// Start timestamp.
        started_at -> Timestamptz,
        /// Completion timestamp.
        finished_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// Background job run ledger.
    job_runs (id) {
        /// Run identifier.
        id -> Uuid,
        /// Organization the job ran for.
        org_id -> Nullable<Uuid>,
        /// Job type such as `sla.scan`.
        #[max_length = 64]
        job_type -> Varchar,
        /// Run status.
        #[max_length = 32]
        status -> Varchar,
        /// Human-readable status message.
        message -> Nullable<Text>,
        /// Result payload.
        result -> Nullable<Jsonb>,
        /// Start timestamp.
        started_at -> Timestamptz,
        /// Completion timestamp.
        finished_at -> Nullable<Timestamptz>,
    }
}

diesel::table! {
    /// In-app notifications.
    notifications (id) {
        /// Notification identifier.
        id -> Uuid,
        /// Owning organization.
        org_id -> Uuid,
        /// Recipient user.
        user_id -> Uuid,
        /// Notification type.
        #[max_length = 32]
        kind -> Varchar,
        /// Title.
        #[max_length = 255]
        title -> Varchar,
        /// Body text.
        message -> Text,
        /// Optional in-app link.
        link -> Nullable<Text>,
        /// Optional metadata payload.
        metadata -> Nullable<Jsonb>,
        /// Read timestamp.
        read_at -> Nullable<Timestamptz>,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Audit trail entries.
    audit_logs (id) {
        /// Entry identifier.
        id -> Uuid,
        /// Owning organization.
        org_id -> Uuid,
        /// Acting user, if any.
        actor_user_id -> Nullable<Uuid>,
        /// Action name such as `TICKET_SLA_BREACHED`.
        #[max_length = 64]
        action -> Varchar,
        /// Entity type such as `Ticket`.
        #[max_length = 64]
        entity_type -> Varchar,
        /// Entity identifier.
        #[max_length = 64]
        entity_id -> Varchar,
        /// Metadata payload.
        metadata -> Jsonb,
        /// Creation timestamp.
        created_at -> Timestamptz,
    }
}

diesel::table! {
    /// Outbound email queue.
    email_queue (id) {
        /// Email identifier.
        id -> Uuid,
        /// Owning organization.
        org_id -> Uuid,
        /// Recipient address.
        #[max_length = 320]
        to_email -> Varchar,
        /// Subject line.
        #[max_length = 255]
        subject -> Varchar,
        /// Body text.
        body -> Text,
        /// Delivery status.
        #[max_length = 32]
        status -> Varchar,
        /// Delivery attempts.
        attempts -> Int4,
        /// Creation timestamp.
        created_at -> Timestamptz,
        /// Delivery timestamp.
        sent_at -> Nullable<Timestamptz>,
    }
}

diesel::joinable!(members -> organizations (org_id));
diesel::joinable!(teams -> organizations (org_id));
diesel::joinable!(team_members -> teams (team_id));
diesel::joinable!(team_members -> members (member_id));
diesel::joinable!(tickets -> organizations (org_id));
diesel::joinable!(ticket_watchers -> tickets (ticket_id));
diesel::joinable!(auto_assign_rules -> organizations (org_id));

diesel::allow_tables_to_appear_in_same_query!(
    organizations,
    members,
    teams,
    team_members,
    tickets,
    ticket_watchers,
    sla_rules,
    auto_assign_rules,
    workflow_runs,
    job_runs,
    notifications,
    audit_logs,
    email_queue,
);
