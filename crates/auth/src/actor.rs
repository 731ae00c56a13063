use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crewdesk_core::{ActorId, DomainError};

use crate::credential::CredentialHash;
use crate::role::Role;

/// Display-only attributes attached to an actor.
///
/// Policy logic never reads these; they exist for audit logs and UI.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorDisplay {
    pub name: String,
    pub email: Option<String>,
}

/// The authenticated identity performing a request.
///
/// Reconstructed from the credential store on every request, immutable once
/// built, and never cached across requests. Policy calls receive the actor
/// as an explicit parameter; there is no ambient "current user" state.
///
/// # Invariants
/// - The role set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    id: ActorId,
    roles: BTreeSet<Role>,
    display: ActorDisplay,
}

impl Actor {
    /// Build an actor, enforcing the non-empty role-set invariant.
    pub fn new(
        id: ActorId,
        roles: impl IntoIterator<Item = Role>,
        display: ActorDisplay,
    ) -> Result<Self, DomainError> {
        let roles: BTreeSet<Role> = roles.into_iter().collect();
        if roles.is_empty() {
            return Err(DomainError::invariant("actor must hold at least one role"));
        }
        Ok(Self { id, roles, display })
    }

    pub fn id(&self) -> ActorId {
        self.id
    }

    pub fn roles(&self) -> &BTreeSet<Role> {
        &self.roles
    }

    pub fn has_role(&self, role: &Role) -> bool {
        self.roles.contains(role)
    }

    pub fn display(&self) -> &ActorDisplay {
        &self.display
    }
}

/// Stored shape of an actor in the credential store.
///
/// This is what [`crate::CredentialStore::find_by_credential_hash`] returns;
/// the authenticator verifies the digest and converts the record into an
/// [`Actor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActorRecord {
    pub id: ActorId,
    pub credential_hash: CredentialHash,
    pub roles: Vec<Role>,
    pub display: ActorDisplay,
}

impl ActorRecord {
    pub(crate) fn into_actor(self) -> Result<Actor, DomainError> {
        Actor::new(self.id, self.roles, self.display)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actor_requires_at_least_one_role() {
        let err = Actor::new(ActorId::new(), Vec::new(), ActorDisplay::default());
        assert!(err.is_err());
    }

    #[test]
    fn duplicate_roles_collapse() {
        let actor = Actor::new(
            ActorId::new(),
            vec![Role::CLIENT, Role::CLIENT, Role::DEVELOPER],
            ActorDisplay::default(),
        )
        .unwrap();
        assert_eq!(actor.roles().len(), 2);
    }

    #[test]
    fn display_attributes_do_not_affect_equality_of_roles() {
        let id = ActorId::new();
        let actor = Actor::new(
            id,
            vec![Role::CLIENT],
            ActorDisplay {
                name: "Dana".to_string(),
                email: Some("dana@example.com".to_string()),
            },
        )
        .unwrap();
        assert!(actor.has_role(&Role::CLIENT));
        assert_eq!(actor.id(), id);
    }
}
