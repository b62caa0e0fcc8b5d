//! LDAP gateway verifier.
//!
//! The gateway is a small HTTP facade in front of the corporate
//! directory: `POST {base}/auth` with the JSON credentials answers 2xx
//! when the pair is valid. Transport failures are reported as
//! [`AuthError::BackendUnreachable`] so the chain can tell an outage
//! from a rejection.

use std::time::Duration;

use async_trait::async_trait;
use log::warn;

use crate::api::{AuthOutcome, Credentials};

use super::{AuthError, CredentialVerifier};

const GATEWAY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct LdapGateway {
    base_url: String,
    client: reqwest::Client,
}

impl LdapGateway {
    pub fn new(base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }
        let client = reqwest::Client::builder()
            .timeout(GATEWAY_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self { base_url, client }
    }

    fn auth_url(&self) -> String {
        format!("{}/auth", self.base_url)
    }

    /// Probe gateway reachability for the auth health endpoint.
    ///
    /// Any HTTP answer counts as reachable, including 4xx; only a
    /// transport-level failure counts as down.
    pub async fn is_reachable(&self) -> bool {
        match self.client.get(&self.base_url).send().await {
            Ok(_) => true,
            Err(e) => {
                warn!("ldap gateway unreachable: {e}");
                false
            }
        }
    }
}

#[async_trait]
impl CredentialVerifier for LdapGateway {
    async fn verify(&self, credentials: &Credentials) -> Result<AuthOutcome, AuthError> {
        let response = self
            .client
            .post(self.auth_url())
            .json(credentials)
            .send()
            .await
            .map_err(|e| AuthError::BackendUnreachable(e.to_string()))?;

        if response.status().is_success() {
            Ok(AuthOutcome {
                username: credentials.username.clone(),
                verified_by: self.name().to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn name(&self) -> &'static str {
        "ldap-gateway"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_url_strips_trailing_slashes() {
        let gateway = LdapGateway::new("http://ldap.internal/");
        assert_eq!(gateway.auth_url(), "http://ldap.internal/auth");
    }

    #[tokio::test]
    async fn unreachable_gateway_reports_backend_down() {
        // 192.0.2.0/24 is reserved for documentation, nothing answers there
        let gateway = LdapGateway::new("http://192.0.2.1:9");
        let err = gateway
            .verify(&Credentials {
                username: "user".to_string(),
                password: "pass".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::BackendUnreachable(_)));
        assert!(!gateway.is_reachable().await);
    }
}
