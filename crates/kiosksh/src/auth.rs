//! Authorization collaborator interface
//!
//! The host application owns authentication and session timeout; the shell
//! only asks three questions: is the session privileged right now, who is
//! acting, and "log out". Queried synchronously before dispatching any
//! admin-tier command and when composing audit records.

use std::sync::atomic::{AtomicBool, Ordering};

/// Authorization state of the acting session.
pub trait Authorizer: Send + Sync {
    /// Whether the session currently holds admin privileges.
    fn is_authorized(&self) -> bool;

    /// Identity of the acting user, used in audit records.
    fn current_identity(&self) -> String;

    /// End the current session.
    fn logout(&self);
}

/// Fixed-identity [`Authorizer`] with an atomic privilege flag.
///
/// Suitable for tests and single-operator CLI sessions; real embeds wire
/// in the host's session manager instead.
pub struct StaticAuthorizer {
    identity: String,
    authorized: AtomicBool,
}

impl StaticAuthorizer {
    pub fn new(identity: impl Into<String>, authorized: bool) -> Self {
        Self {
            identity: identity.into(),
            authorized: AtomicBool::new(authorized),
        }
    }

    /// Deny-all session with identity `"unknown"`; the engine default, so
    /// a misconfigured embed fails closed.
    pub fn deny_all() -> Self {
        Self::new("unknown", false)
    }
}

impl Authorizer for StaticAuthorizer {
    fn is_authorized(&self) -> bool {
        self.authorized.load(Ordering::Relaxed)
    }

    fn current_identity(&self) -> String {
        self.identity.clone()
    }

    fn logout(&self) {
        self.authorized.store(false, Ordering::Relaxed);
    }
}
