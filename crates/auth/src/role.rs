use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::actor::Actor;

/// Role identifier used for policy decisions.
///
/// Role names are case-sensitive opaque strings at this layer; what a role
/// may do is declared exclusively in the policy table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    /// Built-in administrator role.
    pub const ADMIN: Role = Role(Cow::Borrowed("admin"));

    /// Built-in project-manager role.
    pub const MANAGER: Role = Role(Cow::Borrowed("manager"));

    /// Built-in developer role.
    pub const DEVELOPER: Role = Role(Cow::Borrowed("developer"));

    /// Built-in client role (the billed party on invoices/payments).
    pub const CLIENT: Role = Role(Cow::Borrowed("client"));

    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The process-wide role vocabulary.
///
/// Flat by design: no role implies another, so adding a role here grants
/// nothing until the policy table names it. The registry is built once at
/// startup and read-only afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleRegistry {
    names: BTreeSet<Role>,
}

impl RoleRegistry {
    /// Registry with the built-in portal roles.
    pub fn builtin() -> Self {
        Self {
            names: BTreeSet::from([Role::ADMIN, Role::MANAGER, Role::DEVELOPER, Role::CLIENT]),
        }
    }

    /// Empty registry (vocabulary supplied entirely by configuration).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Add an administratively defined role. Idempotent.
    pub fn register(&mut self, role: Role) {
        self.names.insert(role);
    }

    pub fn contains(&self, role: &Role) -> bool {
        self.names.contains(role)
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Role> {
        self.names.iter()
    }

    /// Role names held by `actor` that exist in this vocabulary.
    ///
    /// Names outside the vocabulary cannot appear in the policy table, so
    /// they contribute nothing to any decision.
    pub fn roles_of<'a>(&'a self, actor: &'a Actor) -> impl Iterator<Item = &'a Role> {
        actor.roles().iter().filter(|role| self.contains(role))
    }

    /// Whether `actor` holds at least one of `names` (names unknown to the
    /// vocabulary never match).
    pub fn has_any_role(&self, actor: &Actor, names: &[Role]) -> bool {
        names
            .iter()
            .any(|name| self.contains(name) && actor.has_role(name))
    }
}
