use crate::cli::actions::{health, login, logout, open, request, signup, whoami, Action};
use anyhow::Result;

/// Execute the provided action.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<()> {
    let output = match action {
        Action::Signup(args) => signup::execute(args).await?,
        Action::Login(args) => login::execute(args).await?,
        Action::Logout(args) => logout::execute(&args),
        Action::Whoami(args) => whoami::execute(&args)?,
        Action::Open(args) => open::execute(&args)?,
        Action::Request(args) => request::execute(args).await?,
        Action::Health(args) => health::execute(&args).await?,
    };

    if !output.is_empty() {
        println!("{output}");
    }

    Ok(())
}
