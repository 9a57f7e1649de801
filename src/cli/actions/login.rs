use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use secrecy::SecretString;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub email: String,
    pub password: Option<SecretString>,
}

/// Log in and store the returned session.
/// # Errors
/// Returns an error if the password is missing or the credentials are rejected.
pub async fn execute(args: Args) -> Result<String> {
    let password = super::credentials::password(args.password).await?;
    let ctx = args.globals.context()?;

    let response = ctx
        .login(&args.email, password)
        .await
        .context("login failed")?;

    Ok(format!(
        "Logged in as {} ({})",
        response.user.email, response.user.id
    ))
}
