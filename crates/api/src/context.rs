use std::sync::Arc;

use crewdesk_auth::Actor;

/// Authenticated actor for the current request.
///
/// Inserted by the auth middleware and handed to handlers as an extension,
/// so the actor is always an explicit value threaded into policy calls,
/// never ambient state.
#[derive(Debug, Clone)]
pub struct ActorContext(Arc<Actor>);

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self(Arc::new(actor))
    }

    pub fn actor(&self) -> &Actor {
        &self.0
    }
}
