use crate::cli::{
    actions::{health, login, logout, open, request, signup, whoami, Action},
    commands::{self, api::ARG_API_URL, api::ARG_SESSION_FILE, api::ARG_TIMEOUT},
    globals::{default_session_file, GlobalArgs},
};
use anyhow::{anyhow, Context, Result};
use reqwest::Method;
use secrecy::SecretString;
use std::{path::PathBuf, time::Duration};

fn globals(matches: &clap::ArgMatches) -> Result<GlobalArgs> {
    let api_url = matches
        .get_one::<String>(ARG_API_URL)
        .cloned()
        .context("missing required argument: --api-url")?;

    let session_file = match matches.get_one::<PathBuf>(ARG_SESSION_FILE) {
        Some(path) => path.clone(),
        None => default_session_file()?,
    };

    let timeout = matches
        .get_one::<u64>(ARG_TIMEOUT)
        .copied()
        .map_or(crate::api::DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);

    Ok(GlobalArgs::new(api_url, session_file).with_timeout(timeout))
}

fn required(matches: &clap::ArgMatches, id: &str) -> Result<String> {
    matches
        .get_one::<String>(id)
        .cloned()
        .with_context(|| format!("missing required argument: --{id}"))
}

fn password(matches: &clap::ArgMatches) -> Option<SecretString> {
    matches
        .get_one::<String>(commands::session::ARG_PASSWORD)
        .map(|password| SecretString::from(password.clone()))
}

/// # Errors
/// Returns an error if required arguments are missing or malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let globals = globals(matches)?;

    let action = match matches.subcommand() {
        Some(("signup", sub)) => Action::Signup(signup::Args {
            globals,
            email: required(sub, commands::session::ARG_EMAIL)?,
            password: password(sub),
            name: required(sub, commands::session::ARG_NAME)?,
            university: sub
                .get_one::<String>(commands::session::ARG_UNIVERSITY)
                .cloned(),
        }),
        Some(("login", sub)) => Action::Login(login::Args {
            globals,
            email: required(sub, commands::session::ARG_EMAIL)?,
            password: password(sub),
        }),
        Some(("logout", _)) => Action::Logout(logout::Args { globals }),
        Some(("whoami", _)) => Action::Whoami(whoami::Args { globals }),
        Some(("open", sub)) => Action::Open(open::Args {
            globals,
            path: required(sub, commands::session::ARG_PATH)?,
        }),
        Some(("request", sub)) => {
            let method = required(sub, commands::request::ARG_METHOD)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid HTTP method: {method}"))?;
            let data = sub
                .get_one::<String>(commands::request::ARG_DATA)
                .map(|raw| serde_json::from_str(raw).context("--data is not valid JSON"))
                .transpose()?;

            Action::Request(request::Args {
                globals,
                method,
                path: required(sub, commands::request::ARG_PATH)?,
                data,
            })
        }
        Some(("health", _)) => Action::Health(health::Args { globals }),
        Some((name, _)) => return Err(anyhow!("unknown command: {name}")),
        None => return Err(anyhow!("no command given, see --help")),
    };

    Ok(action)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serde_json::json;

    fn matches(args: &[&str]) -> clap::ArgMatches {
        commands::new().get_matches_from(args.iter().copied())
    }

    #[test]
    fn test_login_action() {
        temp_env::with_vars(
            [
                ("NOTA_EMAIL", None::<&str>),
                ("NOTA_PASSWORD", None),
                ("NOTA_TIMEOUT", None),
            ],
            || {
                let action = handler(&matches(&[
                    "nota",
                    "--session-file",
                    "/tmp/nota.json",
                    "login",
                    "--email",
                    "ada@example.com",
                    "--password",
                    "hunter2",
                ]))
                .unwrap();

                let Action::Login(args) = action else {
                    panic!("expected login action");
                };
                assert_eq!(args.email, "ada@example.com");
                assert_eq!(args.password.unwrap().expose_secret(), "hunter2");
                assert_eq!(args.globals.session_file, PathBuf::from("/tmp/nota.json"));
                assert_eq!(args.globals.timeout, Duration::from_secs(30));
            },
        );
    }

    #[test]
    fn test_request_action() {
        let action = handler(&matches(&[
            "nota",
            "--session-file",
            "/tmp/nota.json",
            "request",
            "patch",
            "notes/7",
            "--data",
            r#"{"title":"Graphs"}"#,
        ]))
        .unwrap();

        let Action::Request(args) = action else {
            panic!("expected request action");
        };
        assert_eq!(args.method, Method::PATCH);
        assert_eq!(args.path, "notes/7");
        assert_eq!(args.data, Some(json!({"title": "Graphs"})));
    }

    #[test]
    fn test_request_rejects_bad_json() {
        let result = handler(&matches(&[
            "nota",
            "--session-file",
            "/tmp/nota.json",
            "request",
            "POST",
            "notes",
            "--data",
            "{oops",
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_open_action() {
        let action = handler(&matches(&[
            "nota",
            "--session-file",
            "/tmp/nota.json",
            "open",
            "/notes/7",
        ]))
        .unwrap();
        assert!(matches!(action, Action::Open(open::Args { ref path, .. }) if path == "/notes/7"));
    }
}
