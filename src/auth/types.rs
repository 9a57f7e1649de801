//! Request and response types for the auth endpoints. Login and signup
//! requests carry the plaintext password, so their `Debug` output redacts it
//! and they must never be logged in full.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize, Serializer};

/// Profile of the authenticated user as returned by the backend.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub university: Option<String>,
    pub role: String,
}

/// Response of `/auth/signup` and `/auth/login`.
///
/// `expires_in` is carried through but never enforced on the client.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(rename = "access_token")]
    pub token: SecretString,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Serialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

#[derive(Serialize)]
pub struct SignupRequest {
    pub email: String,
    #[serde(serialize_with = "expose")]
    pub password: SecretString,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub university: Option<String>,
}

impl std::fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignupRequest")
            .field("email", &self.email)
            .field("password", &"***")
            .field("name", &self.name)
            .field("university", &self.university)
            .finish()
    }
}

fn expose<S: Serializer>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(secret.expose_secret())
}
