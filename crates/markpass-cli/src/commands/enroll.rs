//! Enrollment command: exchange an organizer-issued code for a kiosk token.

use markpass_bridge::ServerBridge;

use crate::cli::EnrollArgs;
use crate::client::{CliError, CliResult};

pub(crate) async fn handle_enroll(bridge: &mut ServerBridge, args: EnrollArgs) -> CliResult<()> {
    let code = args.code.trim();
    if code.is_empty() || !code.chars().all(|ch| ch.is_ascii_digit()) {
        return Err(CliError::validation(
            "enrollment code must be a non-empty sequence of digits",
        ));
    }

    let name = args.name.trim();
    if name.is_empty() {
        return Err(CliError::validation("kiosk name must not be empty"));
    }

    // Url normalizes bare authorities to a trailing "/"; the bridge appends
    // endpoint paths itself.
    let address = args.server.as_str().trim_end_matches('/').to_string();

    let enrolled = bridge
        .enroll(&address, code, name)
        .await
        .map_err(CliError::failure)?;

    if !enrolled {
        return Err(CliError::validation(
            "server rejected the enrollment (check the code and try again)",
        ));
    }

    println!("enrolled kiosk '{name}' with {address}");
    println!("poll for an assignment with 'markpass assignment --watch'");
    Ok(())
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use markpass_bridge::MemoryStore;
    use reqwest::Client;
    use serde_json::json;
    use url::Url;

    use super::*;

    async fn fresh_bridge() -> ServerBridge {
        ServerBridge::restore(Box::new(MemoryStore::new()), Client::new()).await
    }

    fn enroll_args(server: &MockServer, code: &str, name: &str) -> EnrollArgs {
        EnrollArgs {
            server: Url::parse(&server.base_url()).expect("valid URL"),
            code: code.to_string(),
            name: name.to_string(),
        }
    }

    #[tokio::test]
    async fn non_numeric_code_is_rejected_before_any_request() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST).path("/enroll");
            then.status(200).body("TOK123");
        });

        let mut bridge = fresh_bridge().await;
        let result = handle_enroll(&mut bridge, enroll_args(&server, "12a4", "Gate A")).await;

        assert!(matches!(result, Err(CliError::Validation(_))));
        mock.assert_calls(0);
    }

    #[tokio::test]
    async fn successful_enrollment_initializes_the_bridge() {
        let server = MockServer::start_async().await;
        let mock = server.mock(|when, then| {
            when.method(POST)
                .path("/enroll")
                .json_body(json!({"code": "4242", "name": "Gate A"}));
            then.status(200).body("TOK123");
        });

        let mut bridge = fresh_bridge().await;
        handle_enroll(&mut bridge, enroll_args(&server, "4242", "Gate A"))
            .await
            .expect("enroll should succeed");

        assert!(!bridge.need_init());
        mock.assert();
    }

    #[tokio::test]
    async fn server_rejection_surfaces_as_validation_error() {
        let server = MockServer::start_async().await;
        server.mock(|when, then| {
            when.method(POST).path("/enroll");
            then.status(403).body("bad code");
        });

        let mut bridge = fresh_bridge().await;
        let result = handle_enroll(&mut bridge, enroll_args(&server, "0000", "Gate A")).await;

        assert!(matches!(result, Err(CliError::Validation(_))));
        assert!(bridge.need_init());
    }
}
