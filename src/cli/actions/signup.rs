use crate::{auth::types::SignupRequest, cli::globals::GlobalArgs};
use anyhow::{Context, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: Option<SecretString>,
    pub name: String,
    pub university: Option<String>,
}

/// Create an account and store the session it returns.
/// # Errors
/// Returns an error if the password is missing or the API rejects the signup.
pub async fn execute(args: Args) -> Result<String> {
    let password = super::credentials::password(args.password).await?;
    let ctx = args.globals.context()?;

    let request = SignupRequest {
        email: args.email,
        password,
        name: args.name,
        university: args.university,
    };
    let response = ctx.signup(&request).await.context("signup failed")?;

    Ok(format!(
        "Account created for {} ({})",
        response.user.email, response.user.id
    ))
}
