use anyhow::{ensure, Context, Result};
use secrecy::{ExposeSecret, SecretString};
use tokio::io::{AsyncBufReadExt, BufReader};

/// Use the password from the flag or environment, or read the first line of
/// stdin.
pub(crate) async fn password(provided: Option<SecretString>) -> Result<SecretString> {
    let password = match provided {
        Some(password) => password,
        None => {
            let line = BufReader::new(tokio::io::stdin())
                .lines()
                .next_line()
                .await
                .context("failed to read password from stdin")?
                .context("no password given: use --password, NOTA_PASSWORD or stdin")?;
            SecretString::from(line.trim_end_matches('\r').to_string())
        }
    };

    ensure!(!password.expose_secret().is_empty(), "password must not be empty");
    Ok(password)
}
