//! Session context: the single owner of "who is logged in".
//!
//! The context bootstraps once from the session store and then only changes
//! through `login`, `signup` and `logout`. Every transition is published on a
//! watch channel so route guards and other observers re-evaluate without
//! polling.

use crate::{
    api::ApiError,
    auth::{
        types::{AuthResponse, LoginRequest, SignupRequest, User},
        AuthClient, Authenticated,
    },
    guard::RouteGuard,
};
use secrecy::SecretString;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::watch;
use tracing::info;

/// What observers see. A present token means authenticated, even when the
/// user record is missing.
#[derive(Clone, Debug, Default)]
pub struct SessionState {
    pub token: Option<SecretString>,
    pub user: Option<User>,
}

impl SessionState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("the session was cleared before the request completed")]
    Superseded,
}

#[derive(Clone)]
pub struct SessionContext {
    inner: Arc<Inner>,
}

struct Inner {
    auth: AuthClient,
    state: watch::Sender<SessionState>,
    // Serializes publishing against logout.
    transition: Mutex<()>,
}

impl SessionContext {
    /// Build the context and bootstrap it from the persisted session.
    #[must_use]
    pub fn new(auth: AuthClient) -> Self {
        let stored = auth.store().load();
        let state = SessionState {
            token: stored.token,
            user: stored.user,
        };
        info!(
            authenticated = state.is_authenticated(),
            user_id = state.user.as_ref().map(|user| user.id.as_str()),
            "session bootstrapped"
        );

        let (sender, _) = watch::channel(state);
        Self {
            inner: Arc::new(Inner {
                auth,
                state: sender,
                transition: Mutex::new(()),
            }),
        }
    }

    #[must_use]
    pub fn auth(&self) -> &AuthClient {
        &self.inner.auth
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionState> {
        self.inner.state.subscribe()
    }

    /// Guard bound to this context.
    #[must_use]
    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.subscribe())
    }

    /// Log in and become Authenticated. On failure the state is unchanged.
    /// # Errors
    /// Returns the API error, or `Superseded` when a logout happened while
    /// the request was in flight.
    pub async fn login(
        &self,
        email: &str,
        password: SecretString,
    ) -> Result<AuthResponse, SessionError> {
        let request = LoginRequest {
            email: email.to_string(),
            password,
        };
        let generation = self.inner.auth.store().generation();
        let outcome = self.inner.auth.login_at(generation, &request).await?;
        self.publish(generation, outcome)
    }

    /// Sign up and become Authenticated. On failure the state is unchanged.
    /// # Errors
    /// Same as [`SessionContext::login`].
    pub async fn signup(&self, request: &SignupRequest) -> Result<AuthResponse, SessionError> {
        let generation = self.inner.auth.store().generation();
        let outcome = self.inner.auth.signup_at(generation, request).await?;
        self.publish(generation, outcome)
    }

    /// Clear the persisted session and become Unauthenticated.
    pub fn logout(&self) {
        let _guard = self.lock();
        self.inner.auth.logout();
        self.inner.state.send_replace(SessionState::default());
        info!("session transitioned to unauthenticated");
    }

    fn publish(
        &self,
        generation: crate::session::Generation,
        outcome: Authenticated,
    ) -> Result<AuthResponse, SessionError> {
        let _guard = self.lock();
        if !outcome.persisted || !self.inner.auth.store().is_current(generation) {
            return Err(SessionError::Superseded);
        }

        let response = outcome.response;
        self.inner.state.send_replace(SessionState {
            token: Some(response.token.clone()),
            user: Some(response.user.clone()),
        });
        info!(user_id = %response.user.id, "session transitioned to authenticated");

        Ok(response)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .transition
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("authenticated", &self.inner.state.borrow().is_authenticated())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::{
        api::{ApiClient, ApiConfig},
        guard::GuardDecision,
        session::{MemoryStorage, SessionStore, Storage, TOKEN_KEY, USER_KEY},
        test_support::{auth_body, user},
    };
    use anyhow::Result;
    use secrecy::ExposeSecret;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    fn context(base_url: &str, storage: Arc<MemoryStorage>) -> SessionContext {
        let store = SessionStore::new(storage);
        let api = ApiClient::new(&ApiConfig::new(base_url), Arc::new(store.clone())).unwrap();
        SessionContext::new(AuthClient::new(api, store))
    }

    #[test]
    fn bootstrap_without_token_is_unauthenticated_and_redirects() {
        let ctx = context("http://localhost:8000", Arc::new(MemoryStorage::new()));

        assert!(!ctx.snapshot().is_authenticated());
        match ctx.guard().check("/notes/7") {
            GuardDecision::Redirect(redirect) => {
                assert_eq!(redirect.to(), "/login");
                assert_eq!(redirect.return_to(), "/notes/7");
            }
            GuardDecision::Render(_) => panic!("expected redirect"),
        }
    }

    #[test]
    fn bootstrap_with_corrupt_user_is_authenticated_without_user() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(TOKEN_KEY, "abc123").unwrap();
        storage.set(USER_KEY, "[1, 2").unwrap();

        let ctx = context("http://localhost:8000", storage.clone());
        let state = ctx.snapshot();

        assert!(state.is_authenticated());
        assert!(state.user.is_none());
        assert_eq!(storage.get(USER_KEY).unwrap(), None);
        assert_eq!(
            ctx.guard().check("/dashboard"),
            GuardDecision::Render("/dashboard".to_string())
        );
    }

    #[test]
    fn bootstrap_reads_stored_session() {
        let storage = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone()).save(&SecretString::from("abc123"), &user());

        let state = context("http://localhost:8000", storage).snapshot();
        assert_eq!(state.token.unwrap().expose_secret(), "abc123");
        assert_eq!(state.user, Some(user()));
    }

    #[tokio::test]
    async fn login_then_logout_transitions() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(auth_body("tok-1")))
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        let ctx = context(&server.uri(), storage.clone());
        let mut rx = ctx.subscribe();

        ctx.login("ada@example.com", SecretString::from("hunter2"))
            .await?;

        assert!(rx.has_changed()?);
        let state = rx.borrow_and_update().clone();
        assert_eq!(state.token.unwrap().expose_secret(), "tok-1");
        assert_eq!(state.user, Some(user()));

        ctx.logout();
        assert!(rx.has_changed()?);
        assert!(!rx.borrow_and_update().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY)?, None);
        assert_eq!(storage.get(USER_KEY)?, None);
        Ok(())
    }

    #[tokio::test]
    async fn failed_login_keeps_state() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"detail": "Invalid email or password"})),
            )
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        SessionStore::new(storage.clone()).save(&SecretString::from("old"), &user());
        let ctx = context(&server.uri(), storage);
        let rx = ctx.subscribe();

        let err = ctx
            .login("ada@example.com", SecretString::from("nope"))
            .await
            .unwrap_err();

        assert!(matches!(&err, SessionError::Api(api) if api.is_unauthorized()));
        assert!(!rx.has_changed()?);
        assert_eq!(ctx.snapshot().token.unwrap().expose_secret(), "old");
        Ok(())
    }

    #[tokio::test]
    async fn signup_transitions_to_authenticated() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/signup"))
            .respond_with(ResponseTemplate::new(201).set_body_json(auth_body("tok-new")))
            .mount(&server)
            .await;

        let ctx = context(&server.uri(), Arc::new(MemoryStorage::new()));
        let request = SignupRequest {
            email: "ada@example.com".to_string(),
            password: SecretString::from("hunter2"),
            name: "Ada".to_string(),
            university: None,
        };

        ctx.signup(&request).await?;
        assert_eq!(
            ctx.snapshot().token.unwrap().expose_secret(),
            "tok-new"
        );
        Ok(())
    }

    #[tokio::test]
    async fn logout_during_login_supersedes_it() -> Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(auth_body("late"))
                    .set_delay(std::time::Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let storage = Arc::new(MemoryStorage::new());
        let ctx = context(&server.uri(), storage.clone());

        let pending = {
            let ctx = ctx.clone();
            tokio::spawn(async move {
                ctx.login("ada@example.com", SecretString::from("hunter2"))
                    .await
            })
        };
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        ctx.logout();

        let result = pending.await?;
        assert!(matches!(result, Err(SessionError::Superseded)));
        assert!(!ctx.snapshot().is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY)?, None);
        Ok(())
    }
}
