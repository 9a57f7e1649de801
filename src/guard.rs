//! Route guard for protected destinations.
//!
//! The decision is a pure function of the session state: no token means
//! redirect to the login page carrying the requested location, a token means
//! render the destination unchanged. Nothing here touches storage or the
//! network.

use crate::context::SessionState;
use tokio::sync::watch;
use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/login";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    Render(String),
    Redirect(Redirect),
}

/// Redirect to the login page that remembers where the caller was going.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Redirect {
    to: String,
    from: String,
}

impl Redirect {
    #[must_use]
    pub fn to(&self) -> &str {
        &self.to
    }

    /// Location originally requested, to return to after login.
    #[must_use]
    pub fn return_to(&self) -> &str {
        &self.from
    }

    /// Single URL form, e.g. `/login?from=%2Fnotes%2F7`.
    #[must_use]
    pub fn location(&self) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .append_pair("from", &self.from)
            .finish();
        format!("{}?{query}", self.to)
    }
}

#[must_use]
pub fn decide(state: &SessionState, destination: &str) -> GuardDecision {
    if state.is_authenticated() {
        GuardDecision::Render(destination.to_string())
    } else {
        GuardDecision::Redirect(Redirect {
            to: LOGIN_PATH.to_string(),
            from: destination.to_string(),
        })
    }
}

/// Guard that follows a session context.
#[derive(Clone, Debug)]
pub struct RouteGuard {
    rx: watch::Receiver<SessionState>,
}

impl RouteGuard {
    #[must_use]
    pub fn new(rx: watch::Receiver<SessionState>) -> Self {
        Self { rx }
    }

    /// Decide against the latest published state.
    #[must_use]
    pub fn check(&self, destination: &str) -> GuardDecision {
        decide(&self.rx.borrow(), destination)
    }

    /// Wait for the next session transition and decide again. Returns `None`
    /// once the context is gone.
    pub async fn changed(&mut self, destination: &str) -> Option<GuardDecision> {
        self.rx.changed().await.ok()?;
        Some(decide(&self.rx.borrow_and_update(), destination))
    }
}
