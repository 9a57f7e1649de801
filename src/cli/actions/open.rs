use crate::{cli::globals::GlobalArgs, guard::GuardDecision};
use anyhow::Result;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub path: String,
}

/// Run the route guard for `path` against the stored session.
/// # Errors
/// Returns an error if the session context cannot be built.
pub fn execute(args: &Args) -> Result<String> {
    let ctx = args.globals.context()?;

    Ok(match ctx.guard().check(&args.path) {
        GuardDecision::Render(path) => format!("render {path}"),
        GuardDecision::Redirect(redirect) => format!("redirect {}", redirect.location()),
    })
}
