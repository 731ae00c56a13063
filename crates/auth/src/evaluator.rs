//! Policy evaluation: per-record decisions and list row-filters.
//!
//! Evaluation is pure computation over the table and the actor's role set:
//! deterministic for fixed inputs, so callers may safely cache a decision
//! within a single request.

use std::sync::Arc;

use serde::Serialize;

use crewdesk_core::ActorId;

use crate::actor::Actor;
use crate::policy::{
    Action, Effect, OwnedRecord, Ownership, PolicyTable, RecordAction, ResourceKind,
};

/// Outcome of evaluating a single action.
///
/// `Deny` is a normal, expected value, never an error. Genuine faults
/// (malformed tables) are rejected when the table is built, before any
/// request is served.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allow(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Row restriction for list queries.
///
/// Handed to the persistence collaborator as a query constraint. Listing is
/// never fetch-then-filter: that would leak existence and counts, and does
/// not scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowFilter {
    /// Every row is visible.
    Unrestricted,
    /// Only rows owned by this actor are visible.
    OwnedBy(ActorId),
    /// No row is visible (the actor's roles grant no list access).
    DenyAll,
}

/// Combines the policy table with ownership extraction to produce final
/// decisions for single actions and row filters for lists.
#[derive(Debug, Clone)]
pub struct PolicyEvaluator {
    table: Arc<PolicyTable>,
}

impl PolicyEvaluator {
    pub fn new(table: Arc<PolicyTable>) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PolicyTable {
        &self.table
    }

    /// Most permissive effect among the actor's roles for (kind, action).
    ///
    /// A max-reduce over the [`Effect`] ordering, not a short-circuiting
    /// scan: "a user who is both developer and client gets developer-level
    /// access" falls out of `max`.
    fn combined_effect(&self, actor: &Actor, kind: &ResourceKind, action: Action) -> Effect {
        actor
            .roles()
            .iter()
            .map(|role| self.table.effect(kind, action, role))
            .max()
            .unwrap_or(Effect::Deny)
    }

    /// Row filter for a list query against `kind`.
    pub fn can_list(&self, actor: &Actor, kind: &ResourceKind) -> RowFilter {
        match self.combined_effect(actor, kind, Action::List) {
            Effect::Allow => RowFilter::Unrestricted,
            Effect::AllowOwnOnly => RowFilter::OwnedBy(actor.id()),
            Effect::Deny => RowFilter::DenyAll,
        }
    }

    /// Decision for creating a record of `kind` (no target record exists yet).
    pub fn can_create(&self, actor: &Actor, kind: &ResourceKind) -> Decision {
        match self.combined_effect(actor, kind, Action::Create) {
            // Ownership cannot restrict a record that does not exist yet; an
            // own-only grant admits the create.
            Effect::Allow | Effect::AllowOwnOnly => Decision::Allow,
            Effect::Deny => Decision::Deny,
        }
    }

    /// Decision for reading/updating/deleting an existing record.
    pub fn can_act(
        &self,
        actor: &Actor,
        kind: &ResourceKind,
        action: RecordAction,
        record: &dyn OwnedRecord,
    ) -> Decision {
        match self.combined_effect(actor, kind, action.into()) {
            Effect::Allow => Decision::Allow,
            Effect::Deny => Decision::Deny,
            Effect::AllowOwnOnly => match record.owners() {
                Ownership::OwnedBy(owners) if owners.contains(&actor.id()) => Decision::Allow,
                Ownership::OwnedBy(_) => Decision::Deny,
                Ownership::Unowned => {
                    // Startup validation guarantees the *kind* declares
                    // ownership, so a record with no resolvable owner is
                    // malformed data. Fail closed.
                    tracing::warn!(
                        kind = %kind,
                        "record reported no owner under an own-only rule; denying"
                    );
                    Decision::Deny
                }
            },
        }
    }

    /// Why a decision comes out the way it does (audit/debugging view).
    pub fn explain(
        &self,
        actor: &Actor,
        kind: &ResourceKind,
        action: Action,
    ) -> DecisionExplanation {
        let per_role: Vec<RoleEffect> = actor
            .roles()
            .iter()
            .map(|role| RoleEffect {
                role: role.as_str().to_string(),
                effect: self.table.effect(kind, action, role),
            })
            .collect();

        let combined = per_role
            .iter()
            .map(|entry| entry.effect)
            .max()
            .unwrap_or(Effect::Deny);

        DecisionExplanation {
            kind: kind.as_str().to_string(),
            action,
            actor_id: actor.id(),
            per_role,
            combined,
            ownership_applies: combined == Effect::AllowOwnOnly,
        }
    }
}

/// Detailed explanation of a policy decision.
///
/// Answers "why was this allowed/denied?" for audit trails without re-running
/// the evaluation by hand.
#[derive(Debug, Clone, Serialize)]
pub struct DecisionExplanation {
    pub kind: String,
    pub action: Action,
    pub actor_id: ActorId,
    /// Effect contributed by each of the actor's roles.
    pub per_role: Vec<RoleEffect>,
    /// Combined (most permissive) effect across those roles.
    pub combined: Effect,
    /// Whether the final decision additionally depends on an ownership
    /// comparison against the target record.
    pub ownership_applies: bool,
}

/// One role's contribution to a decision.
#[derive(Debug, Clone, Serialize)]
pub struct RoleEffect {
    pub role: String,
    pub effect: Effect,
}
