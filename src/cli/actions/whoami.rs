use crate::cli::globals::GlobalArgs;
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Describe the stored session without contacting the server.
/// # Errors
/// Returns an error if the user record cannot be rendered.
pub fn execute(args: &Args) -> Result<String> {
    let stored = args.globals.store().load();

    if stored.token.is_none() {
        return Ok("Not logged in".to_string());
    }

    match stored.user {
        Some(user) => Ok(serde_json::to_string_pretty(&user)?),
        None => Ok("Logged in (no profile stored)".to_string()),
    }
}
