//! # Nota (client session core)
//!
//! `nota` is the authenticated-session and API-access layer of the Nota study
//! assistant. It owns the bearer token and user profile the backend issues at
//! login, keeps them durable across restarts, and attaches the token to every
//! outbound request.
//!
//! ## Layers
//!
//! - **Session store** (`session`): durable `auth.token` and `auth.user` keys.
//!   Storage faults never surface; a corrupt user record is discarded.
//! - **API transport** (`api`): one client for every backend call. Adds the
//!   bearer token when present and turns non-2xx answers into a uniform
//!   `ApiError::Request`.
//! - **Auth operations** (`auth`): signup and login write through to the store
//!   on success only. Logout is local.
//! - **Session context** (`context`): bootstraps once from the store and
//!   broadcasts every transition.
//! - **Route guard** (`guard`): redirects to `/login` when no token is present.
//!
//! Tokens are secrets. They are held in `SecretString` and never logged.

pub mod api;
pub mod auth;
pub mod cli;
pub mod context;
pub mod guard;
pub mod session;

#[cfg(test)]
mod test_support;

pub const GIT_COMMIT_HASH: &str = env!("NOTA_GIT_SHA");

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
