// Password authentication with an authenticator allow-list.
//
// The server announces its authenticator class when a connection is
// opened. Credentials are only sent to classes on the allow-list; an
// empty list accepts any class.

use async_trait::async_trait;
use scylla::authentication::{AuthError, AuthenticatorProvider, AuthenticatorSession};

pub struct AllowListAuthenticator {
    username: String,
    password: String,
    allowed: Vec<String>,
}

impl AllowListAuthenticator {
    pub fn new(username: &str, password: &str, allowed: Vec<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
            allowed,
        }
    }

    pub fn is_allowed(&self, authenticator: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|a| a == authenticator)
    }

    /// SASL PLAIN initial response: `\0user\0password`.
    fn initial_token(&self) -> Vec<u8> {
        let mut token = Vec::with_capacity(self.username.len() + self.password.len() + 2);
        token.push(0);
        token.extend_from_slice(self.username.as_bytes());
        token.push(0);
        token.extend_from_slice(self.password.as_bytes());
        token
    }
}

#[async_trait]
impl AuthenticatorProvider for AllowListAuthenticator {
    async fn start_authentication_session(
        &self,
        authenticator_name: &str,
    ) -> Result<(Option<Vec<u8>>, Box<dyn AuthenticatorSession>), AuthError> {
        if !self.is_allowed(authenticator_name) {
            return Err(format!(
                "authenticator `{authenticator_name}` is not in the allowed authenticators list"
            ));
        }

        Ok((Some(self.initial_token()), Box::new(PlainSession)))
    }
}

struct PlainSession;

#[async_trait]
impl AuthenticatorSession for PlainSession {
    async fn evaluate_challenge(
        &mut self,
        _token: Option<&[u8]>,
    ) -> Result<Option<Vec<u8>>, AuthError> {
        Err("unexpected authentication challenge".to_string())
    }

    async fn success(&mut self, _token: Option<&[u8]>) -> Result<(), AuthError> {
        Ok(())
    }
}
