use crate::{auth, cli::globals::GlobalArgs};

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
}

/// Forget the stored session. Neither the server nor the HTTP client is
/// touched, so this works with any `--api-url`.
#[must_use]
pub fn execute(args: &Args) -> String {
    auth::end_session(&args.globals.store());
    "Logged out".to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    #[test]
    fn test_logout_removes_session_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let args = Args {
            globals: GlobalArgs::new("http://localhost:8000".to_string(), path.clone()),
        };
        args.globals
            .store()
            .save(&SecretString::from("abc123"), &crate::test_support::user());
        assert!(path.exists());

        assert_eq!(execute(&args), "Logged out");
        assert!(!path.exists());
    }

    #[test]
    fn test_logout_ignores_bad_api_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        let args = Args {
            globals: GlobalArgs::new("not a url".to_string(), path.clone()),
        };
        args.globals
            .store()
            .save(&SecretString::from("abc123"), &crate::test_support::user());

        assert_eq!(execute(&args), "Logged out");
        assert!(args.globals.store().load().token.is_none());
    }
}
