//! Declarative policy table: (resource kind, action, role) → effect.
//!
//! The table is the single source of truth for what a role may do. New
//! resource types are onboarded by adding a table entry and an ownership
//! extractor, never by new branching code in handlers.

use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crewdesk_core::ActorId;

use crate::role::{Role, RoleRegistry};

/// Action under access control.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    List,
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub const ALL: [Action; 5] = [
        Action::List,
        Action::Create,
        Action::Read,
        Action::Update,
        Action::Delete,
    ];
}

/// Action that targets a single existing record.
///
/// Typed separately from [`Action`] so record-less evaluation (list, create)
/// cannot be called with a record-requiring action by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordAction {
    Read,
    Update,
    Delete,
}

impl From<RecordAction> for Action {
    fn from(value: RecordAction) -> Self {
        match value {
            RecordAction::Read => Action::Read,
            RecordAction::Update => Action::Update,
            RecordAction::Delete => Action::Delete,
        }
    }
}

/// Outcome of a single (kind, action, role) rule.
///
/// The derived order (`Deny < AllowOwnOnly < Allow`) is what multi-role
/// combination reduces over: an actor receives the most permissive effect
/// among its roles.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    #[default]
    Deny,
    AllowOwnOnly,
    Allow,
}

/// Resource-type name under access control (e.g. `invoice`, `board`).
///
/// Opaque at this layer; the table and the record types give it meaning.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResourceKind(Cow<'static, str>);

impl ResourceKind {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Owner set extracted from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Ownership {
    /// The record has no natural owner.
    Unowned,
    /// The record is owned by this set of actors. Usually one; messages
    /// have two (sender and receiver).
    OwnedBy(BTreeSet<ActorId>),
}

impl Ownership {
    pub fn one(id: ActorId) -> Self {
        Self::OwnedBy(BTreeSet::from([id]))
    }

    pub fn many(ids: impl IntoIterator<Item = ActorId>) -> Self {
        Self::OwnedBy(ids.into_iter().collect())
    }

    pub fn includes(&self, id: ActorId) -> bool {
        match self {
            Self::Unowned => false,
            Self::OwnedBy(set) => set.contains(&id),
        }
    }
}

/// Ownership extractor implemented by every record type placed under
/// row-level rules.
pub trait OwnedRecord {
    /// Eligible owner ids for this record. Pure; must not touch IO.
    fn owners(&self) -> Ownership;
}

/// Whether a resource kind declares an ownership extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OwnershipMode {
    /// No natural owner; `allow_own_only` rules are rejected at load time.
    None,
    /// Records of this kind resolve to a set of owning actor ids.
    Owned,
}

/// Declarative source for one resource kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourcePolicyConfig {
    pub ownership: OwnershipMode,
    /// action → role name → effect. Missing entries default to deny.
    #[serde(default)]
    pub rules: BTreeMap<Action, BTreeMap<String, Effect>>,
}

/// Declarative source for the whole table (what `policy.json` parses to).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    pub roles: Vec<String>,
    pub resources: BTreeMap<String, ResourcePolicyConfig>,
}

impl PolicyConfig {
    pub fn from_json_str(s: &str) -> Result<Self, PolicyConfigError> {
        serde_json::from_str(s).map_err(|e| PolicyConfigError::Parse(e.to_string()))
    }
}

/// Startup-time policy faults.
///
/// Fatal by contract: the process must never serve traffic with a partially
/// valid table, and must never degrade to allow-all or deny-all.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyConfigError {
    #[error("policy source is not valid JSON: {0}")]
    Parse(String),

    #[error("policy declares no roles")]
    NoRoles,

    #[error("rule for {kind}/{action:?} references unknown role '{role}'")]
    UnknownRole {
        kind: String,
        action: Action,
        role: String,
    },

    #[error("'{kind}' has allow_own_only rules but declares no ownership")]
    OwnershipRequired { kind: String },
}

#[derive(Debug, Clone)]
struct ResourcePolicy {
    ownership: OwnershipMode,
    rules: BTreeMap<Action, BTreeMap<Role, Effect>>,
}

/// The validated (resource kind, action, role) → effect table.
///
/// Built once at startup and immutable afterwards; a policy change builds a
/// fresh table and swaps the shared handle, it never mutates in place. Safe
/// for unlimited concurrent readers.
#[derive(Debug, Clone)]
pub struct PolicyTable {
    registry: RoleRegistry,
    resources: BTreeMap<ResourceKind, ResourcePolicy>,
}

impl PolicyTable {
    /// Validate and compile a declarative config.
    pub fn from_config(config: PolicyConfig) -> Result<Self, PolicyConfigError> {
        if config.roles.is_empty() {
            return Err(PolicyConfigError::NoRoles);
        }

        let mut registry = RoleRegistry::empty();
        for name in config.roles {
            registry.register(Role::new(name));
        }

        let mut resources = BTreeMap::new();
        for (kind_name, resource) in config.resources {
            let ResourcePolicyConfig { ownership, rules } = resource;

            let mut compiled: BTreeMap<Action, BTreeMap<Role, Effect>> = BTreeMap::new();
            for (action, by_role) in rules {
                let mut compiled_roles = BTreeMap::new();
                for (role_name, effect) in by_role {
                    let role = Role::new(role_name.clone());
                    if !registry.contains(&role) {
                        return Err(PolicyConfigError::UnknownRole {
                            kind: kind_name,
                            action,
                            role: role_name,
                        });
                    }
                    if effect == Effect::AllowOwnOnly && ownership == OwnershipMode::None {
                        return Err(PolicyConfigError::OwnershipRequired { kind: kind_name });
                    }
                    compiled_roles.insert(role, effect);
                }
                compiled.insert(action, compiled_roles);
            }

            resources.insert(
                ResourceKind::new(kind_name),
                ResourcePolicy {
                    ownership,
                    rules: compiled,
                },
            );
        }

        Ok(Self {
            registry,
            resources,
        })
    }

    /// Effect for a single (kind, action, role). Absent entries (unknown
    /// kind, action without rules, role not named) are `Deny`.
    pub fn effect(&self, kind: &ResourceKind, action: Action, role: &Role) -> Effect {
        self.resources
            .get(kind)
            .and_then(|resource| resource.rules.get(&action))
            .and_then(|by_role| by_role.get(role))
            .copied()
            .unwrap_or(Effect::Deny)
    }

    /// Declared ownership mode for a kind (unknown kinds have none).
    pub fn ownership(&self, kind: &ResourceKind) -> OwnershipMode {
        self.resources
            .get(kind)
            .map(|resource| resource.ownership)
            .unwrap_or(OwnershipMode::None)
    }

    pub fn registry(&self) -> &RoleRegistry {
        &self.registry
    }

    pub fn kinds(&self) -> impl Iterator<Item = &ResourceKind> {
        self.resources.keys()
    }
}
