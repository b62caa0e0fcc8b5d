//! Local credential verifiers: the admin bypass and the static user table.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::api::{AuthOutcome, Credentials};

use super::{AuthError, CredentialVerifier};

/// Literal admin credential configured for the deployment.
///
/// Checked before any backend so operators keep access when the LDAP
/// gateway is down.
pub struct AdminBypass {
    username: String,
    password: String,
}

impl AdminBypass {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

#[async_trait]
impl CredentialVerifier for AdminBypass {
    async fn verify(&self, credentials: &Credentials) -> Result<AuthOutcome, AuthError> {
        if credentials.username == self.username && credentials.password == self.password {
            Ok(AuthOutcome {
                username: credentials.username.clone(),
                verified_by: self.name().to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn name(&self) -> &'static str {
        "admin"
    }
}

/// Configured user table with SHA-256 password digests.
///
/// Passwords are never stored or compared in plaintext; the incoming
/// password is hashed and matched against the stored hex digest.
pub struct StaticTable {
    users: Vec<(String, String)>,
}

impl StaticTable {
    /// Build from `(username, sha256-hex-digest)` pairs. Digests are
    /// lowercased so the comparison is case-insensitive on the hex side.
    pub fn new(users: Vec<(String, String)>) -> Self {
        let users = users
            .into_iter()
            .map(|(user, digest)| (user, digest.to_lowercase()))
            .collect();
        Self { users }
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Hex SHA-256 digest of a password, as stored in the user table.
pub fn password_digest(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[async_trait]
impl CredentialVerifier for StaticTable {
    async fn verify(&self, credentials: &Credentials) -> Result<AuthOutcome, AuthError> {
        let digest = password_digest(&credentials.password);
        let matched = self
            .users
            .iter()
            .any(|(user, stored)| *user == credentials.username && *stored == digest);
        if matched {
            Ok(AuthOutcome {
                username: credentials.username.clone(),
                verified_by: self.name().to_string(),
            })
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds(user: &str, password: &str) -> Credentials {
        Credentials {
            username: user.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn admin_bypass_matches_literal_pair() {
        let verifier = AdminBypass::new("admin", "admin");
        let outcome = verifier.verify(&creds("admin", "admin")).await.unwrap();
        assert_eq!(outcome.verified_by, "admin");

        assert!(matches!(
            verifier.verify(&creds("admin", "wrong")).await,
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn static_table_compares_digests() {
        let table = StaticTable::new(vec![(
            "oper".to_string(),
            password_digest("s3cret").to_uppercase(),
        )]);
        let outcome = table.verify(&creds("oper", "s3cret")).await.unwrap();
        assert_eq!(outcome.verified_by, "static");

        assert!(table.verify(&creds("oper", "other")).await.is_err());
        assert!(table.verify(&creds("ghost", "s3cret")).await.is_err());
    }
}
