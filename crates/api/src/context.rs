use bookshelf_service::Actor;

/// Resolved caller for a request.
///
/// Inserted by the auth middleware, read by handlers. Resolution happens
/// exactly once per request; every service call receives this same actor.
#[derive(Debug, Clone)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }
}
