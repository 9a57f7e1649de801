//! Signup, login and logout against the Nota auth endpoints.
//!
//! A successful signup or login writes the token and user through to the
//! session store before returning. A failure propagates unchanged and leaves
//! the store untouched, so a bad login never destroys a valid prior session.
//! Logout is local: it clears the store and sends nothing to the server.
//!
//! Request bodies carry the plaintext password; they must never be logged.

pub mod types;

use crate::{
    api::{ApiClient, ApiError},
    session::{Generation, SessionStore},
};
use secrecy::SecretString;
use tracing::{info, instrument, warn};

use self::types::{AuthResponse, LoginRequest, SignupRequest};

pub const SIGNUP_PATH: &str = "/auth/signup";
pub const LOGIN_PATH: &str = "/auth/login";

#[derive(Clone, Debug)]
pub struct AuthClient {
    api: ApiClient,
    store: SessionStore,
}

/// Auth response plus whether its write-through reached the store.
#[derive(Debug)]
pub(crate) struct Authenticated {
    pub response: AuthResponse,
    pub persisted: bool,
}

impl AuthClient {
    #[must_use]
    pub fn new(api: ApiClient, store: SessionStore) -> Self {
        Self { api, store }
    }

    #[must_use]
    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Create an account and persist the returned session.
    /// # Errors
    /// Returns the transport error unchanged; the store is not modified.
    pub async fn signup(
        &self,
        email: &str,
        password: SecretString,
        name: &str,
    ) -> Result<AuthResponse, ApiError> {
        let request = SignupRequest {
            email: email.to_string(),
            password,
            name: name.to_string(),
            university: None,
        };
        Ok(self
            .signup_at(self.store.generation(), &request)
            .await?
            .response)
    }

    /// Signup including the optional university field.
    /// # Errors
    /// Returns the transport error unchanged; the store is not modified.
    pub async fn signup_with(&self, request: &SignupRequest) -> Result<AuthResponse, ApiError> {
        Ok(self
            .signup_at(self.store.generation(), request)
            .await?
            .response)
    }

    /// Authenticate and persist the returned session.
    /// # Errors
    /// Returns the transport error unchanged; the store is not modified.
    pub async fn login(&self, email: &str, password: SecretString) -> Result<AuthResponse, ApiError> {
        let request = LoginRequest {
            email: email.to_string(),
            password,
        };
        Ok(self
            .login_at(self.store.generation(), &request)
            .await?
            .response)
    }

    /// Drop the persisted session. No network call is made, so the token
    /// stays valid server-side until it expires there.
    pub fn logout(&self) {
        end_session(&self.store);
    }

    #[instrument(skip_all, fields(email = %request.email))]
    pub(crate) async fn signup_at(
        &self,
        generation: Generation,
        request: &SignupRequest,
    ) -> Result<Authenticated, ApiError> {
        let response: AuthResponse = self.api.post(SIGNUP_PATH, Some(request)).await?.decode()?;
        Ok(self.write_through(generation, response))
    }

    #[instrument(skip_all, fields(email = %request.email))]
    pub(crate) async fn login_at(
        &self,
        generation: Generation,
        request: &LoginRequest,
    ) -> Result<Authenticated, ApiError> {
        let response: AuthResponse = self.api.post(LOGIN_PATH, Some(request)).await?.decode()?;
        Ok(self.write_through(generation, response))
    }

    fn write_through(&self, generation: Generation, response: AuthResponse) -> Authenticated {
        let persisted = self
            .store
            .save_if_current(generation, &response.token, &response.user);
        if persisted {
            info!(user_id = %response.user.id, "session stored");
        } else {
            warn!(
                user_id = %response.user.id,
                "session was cleared while the request was in flight, not storing it"
            );
        }
        Authenticated {
            response,
            persisted,
        }
    }
}

/// Local logout on a bare store, for callers that have no transport.
pub fn end_session(store: &SessionStore) {
    store.clear();
    info!("session cleared");
}
