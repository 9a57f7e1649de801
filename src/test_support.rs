//! Fixtures shared by unit tests across modules.

use crate::auth::types::User;
use serde_json::{json, Value};

pub(crate) fn user() -> User {
    User {
        id: "u-42".to_string(),
        email: "ada@example.com".to_string(),
        name: Some("Ada".to_string()),
        university: None,
        role: "student".to_string(),
    }
}

pub(crate) fn auth_body(token: &str) -> Value {
    json!({
        "access_token": token,
        "token_type": "bearer",
        "expires_in": 3600,
        "user": {
            "id": "u-42",
            "email": "ada@example.com",
            "name": "Ada",
            "university": null,
            "role": "student"
        }
    })
}
