use crate::{api::ApiResponse, cli::globals::GlobalArgs};
use anyhow::{Context, Result};
use reqwest::Method;
use serde_json::Value;

#[derive(Debug)]
pub struct Args {
    pub globals: GlobalArgs,
    pub method: Method,
    pub path: String,
    pub data: Option<Value>,
}

/// Send one request with the stored bearer token and render the response.
/// # Errors
/// Returns an error if the request fails or the server answers non-2xx.
pub async fn execute(args: Args) -> Result<String> {
    let ctx = args.globals.context()?;

    let response = ctx
        .auth()
        .api()
        .request(args.method.clone(), &args.path, args.data.as_ref())
        .await
        .with_context(|| format!("{} {} failed", args.method, args.path))?;

    Ok(match response {
        ApiResponse::Empty => String::new(),
        ApiResponse::Json(value) => serde_json::to_string_pretty(&value)?,
        ApiResponse::Text(text) => text,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;
    use serde_json::json;
    use std::net::TcpListener;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn can_bind_localhost() -> bool {
        TcpListener::bind("127.0.0.1:0").is_ok()
    }

    #[tokio::test]
    async fn test_request_sends_stored_token() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/notes"))
            .and(header("Authorization", "Bearer abc123"))
            .and(body_json(json!({"title": "Graphs"})))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let globals = GlobalArgs::new(server.uri(), dir.path().join("session.json"));
        globals
            .store()
            .save(&SecretString::from("abc123"), &crate::test_support::user());

        let output = execute(Args {
            globals,
            method: Method::POST,
            path: "notes".to_string(),
            data: Some(json!({"title": "Graphs"})),
        })
        .await?;

        assert_eq!(output, serde_json::to_string_pretty(&json!({"id": 7}))?);
        Ok(())
    }

    #[tokio::test]
    async fn test_request_failure_carries_message() -> anyhow::Result<()> {
        if !can_bind_localhost() {
            eprintln!("Skipping test: cannot bind localhost");
            return Ok(());
        }
        let server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/notes/9"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Not found"})))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir()?;
        let err = execute(Args {
            globals: GlobalArgs::new(server.uri(), dir.path().join("session.json")),
            method: Method::DELETE,
            path: "/notes/9".to_string(),
            data: None,
        })
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "DELETE /notes/9 failed");
        let api = err.downcast_ref::<crate::api::ApiError>().unwrap();
        assert_eq!(api.status(), Some(404));
        assert_eq!(api.to_string(), "Not found");
        Ok(())
    }
}
