pub mod health;
pub mod login;
pub mod logout;
pub mod open;
pub mod request;
pub mod signup;
pub mod whoami;

mod credentials;

// Internal "interpreter" for `Action`.
// We keep the match in a separate module so `mod.rs` stays small as more actions are added.
mod run;

#[derive(Debug)]
pub enum Action {
    Signup(signup::Args),
    Login(login::Args),
    Logout(logout::Args),
    Whoami(whoami::Args),
    Open(open::Args),
    Request(request::Args),
    Health(health::Args),
}

impl Action {
    /// Execute the action.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        run::execute(self).await
    }
}
