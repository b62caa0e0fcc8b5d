//! Credential verification.
//!
//! Login goes through an ordered chain of [`CredentialVerifier`]s:
//! the configured admin bypass, then the static user table, then the
//! LDAP gateway when one is configured. The first verifier that accepts
//! the pair wins; an unreachable backend never masks a later success.

pub mod gateway;
pub mod static_table;

use std::sync::Arc;

use async_trait::async_trait;
use log::info;
use thiserror::Error;

use crate::api::{AuthOutcome, Credentials};
use crate::config::AuthConfig;

pub use gateway::LdapGateway;
pub use static_table::{password_digest, AdminBypass, StaticTable};

/// Why a credential check did not produce an [`AuthOutcome`].
#[derive(Debug, Error)]
pub enum AuthError {
    /// The credentials were checked and rejected.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The verifier's backend could not be reached at all.
    #[error("authentication backend unreachable: {0}")]
    BackendUnreachable(String),
}

/// One way of checking a username/password pair.
#[async_trait]
pub trait CredentialVerifier: Send + Sync {
    async fn verify(&self, credentials: &Credentials) -> Result<AuthOutcome, AuthError>;

    /// Short verifier name, echoed in `AuthOutcome::verified_by` and the
    /// auth health endpoint.
    fn name(&self) -> &'static str;
}

/// Ordered verifier chain built from the deployment configuration.
pub struct VerifierChain {
    verifiers: Vec<Arc<dyn CredentialVerifier>>,
    /// Shared with the entry in `verifiers` so one HTTP client serves
    /// both login and the health probe
    gateway: Option<Arc<LdapGateway>>,
}

impl VerifierChain {
    /// Assemble the chain: admin bypass, static table (when non-empty),
    /// LDAP gateway (when a URL is configured).
    pub fn from_config(config: &AuthConfig) -> Self {
        let mut verifiers: Vec<Arc<dyn CredentialVerifier>> = vec![Arc::new(AdminBypass::new(
            config.admin_username.clone(),
            config.admin_password.clone(),
        ))];

        let table = StaticTable::new(config.users.clone());
        if !table.is_empty() {
            verifiers.push(Arc::new(table));
        }

        let mut gateway = None;
        if let Some(url) = &config.gateway_url {
            let shared = Arc::new(LdapGateway::new(url.clone()));
            verifiers.push(shared.clone());
            gateway = Some(shared);
        }

        Self { verifiers, gateway }
    }

    /// Names of the verifiers in chain order.
    pub fn verifier_names(&self) -> Vec<&'static str> {
        self.verifiers.iter().map(|v| v.name()).collect()
    }

    /// Whether an LDAP gateway is part of the chain, and if so whether it
    /// currently answers. `None` means no gateway is configured.
    pub async fn gateway_health(&self) -> Option<bool> {
        match &self.gateway {
            Some(gateway) => Some(gateway.is_reachable().await),
            None => None,
        }
    }

    /// Run the chain: first success wins.
    ///
    /// A rejection from any verifier downgrades a later outage to
    /// `InvalidCredentials`; `BackendUnreachable` is only reported when
    /// every verifier that ran failed to answer, which cannot happen
    /// while the admin bypass is first. Unknown users therefore fail
    /// with `InvalidCredentials` even when the gateway is down.
    pub async fn verify(&self, credentials: &Credentials) -> Result<AuthOutcome, AuthError> {
        let mut any_rejected = false;
        let mut last_unreachable: Option<AuthError> = None;

        for verifier in &self.verifiers {
            match verifier.verify(credentials).await {
                Ok(outcome) => {
                    info!(
                        "login for {} accepted by {}",
                        outcome.username,
                        verifier.name()
                    );
                    return Ok(outcome);
                }
                Err(AuthError::InvalidCredentials) => {
                    any_rejected = true;
                }
                Err(e @ AuthError::BackendUnreachable(_)) => {
                    last_unreachable = Some(e);
                }
            }
        }

        match last_unreachable {
            Some(e) if !any_rejected => Err(e),
            _ => Err(AuthError::InvalidCredentials),
        }
    }
}
