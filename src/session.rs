// Session state: the one mutable piece of the program. It lives in memory
// only, so every process starts unauthenticated.

use tracing::{info, warn};

use crate::api::{ApiClient, AuthenticatedUser};
use crate::error::{CliError, Result};

#[derive(Debug, Default)]
pub struct Session {
    token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    /// Validate `raw` against the API and keep it if accepted. On any
    /// failure the session is left unauthenticated, even if a token was
    /// active before.
    pub fn set_token(&mut self, raw: &str, api: &ApiClient) -> Result<AuthenticatedUser> {
        if raw.is_empty() {
            return Err(CliError::EmptyToken);
        }
        self.token = None;
        match api.authenticate(raw) {
            Ok(user) => {
                info!(login = %user.login, "token accepted");
                self.token = Some(raw.to_string());
                Ok(user)
            }
            Err(e) => {
                warn!(error = %e, "token rejected");
                Err(e)
            }
        }
    }

    /// Forget the token. Calling it twice is fine.
    pub fn clear(&mut self) {
        self.token = None;
    }

    /// The active token, for calls that write on the user's behalf.
    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(CliError::NotAuthenticated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use mockito::Server;

    fn client_for(server: &Server) -> ApiClient {
        ApiClient::new(ClientConfig::with_base_url(server.url())).unwrap()
    }

    #[test]
    fn starts_unauthenticated() {
        let session = Session::new();
        assert!(!session.is_authenticated());
        assert!(matches!(session.require_token(), Err(CliError::NotAuthenticated)));
    }

    #[test]
    fn empty_token_is_rejected_without_a_request() {
        let mut server = Server::new();
        let mock = server.mock("GET", "/user").expect(0).create();
        let api = client_for(&server);

        let mut session = Session::new();
        let err = session.set_token("", &api).unwrap_err();
        assert!(matches!(err, CliError::EmptyToken));
        assert!(!session.is_authenticated());
        mock.assert();
    }

    #[test]
    fn accepted_token_becomes_active() {
        let mut server = Server::new();
        server
            .mock("GET", "/user")
            .match_header("authorization", "token good")
            .with_status(200)
            .with_body(r#"{"login":"octocat"}"#)
            .create();
        let api = client_for(&server);

        let mut session = Session::new();
        let user = session.set_token("good", &api).unwrap();
        assert_eq!(user.login, "octocat");
        assert_eq!(session.require_token().unwrap(), "good");
    }

    #[test]
    fn rejected_token_drops_previous_one() {
        let mut server = Server::new();
        server
            .mock("GET", "/user")
            .match_header("authorization", "token good")
            .with_status(200)
            .with_body(r#"{"login":"octocat"}"#)
            .create();
        server
            .mock("GET", "/user")
            .match_header("authorization", "token bad")
            .with_status(401)
            .create();
        let api = client_for(&server);

        let mut session = Session::new();
        session.set_token("good", &api).unwrap();
        let err = session.set_token("bad", &api).unwrap_err();
        assert!(err.is_auth());
        assert!(!session.is_authenticated());
    }

    #[test]
    fn clear_is_idempotent() {
        let mut session = Session::new();
        session.clear();
        session.clear();
        assert!(!session.is_authenticated());
    }
}
