//! Repository factory.
//!
//! Backends are selected at runtime (`REPOSITORY_TYPE` or config) so the
//! handlers never know which store answers them.

use std::str::FromStr;
use std::sync::Arc;

use super::repositories::{FileRepository, GithubRepository};
#[cfg(feature = "local-repo")]
use super::repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
use super::repositories::SqliteRepository;
use super::repository::FullRepository;
use crate::config::ServiceConfig;
use crate::store::error::StoreResult;

/// Which backing store serves snapshots and history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryType {
    /// In-memory store
    Local,
    /// Flat JSON files under the data directory
    File,
    /// Raw-content GitHub host
    Github,
    /// Diesel/SQLite history cache
    Sqlite,
}

impl FromStr for RepositoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" | "memory" => Ok(Self::Local),
            "file" | "fs" => Ok(Self::File),
            "github" | "remote" => Ok(Self::Github),
            "sqlite" | "db" => Ok(Self::Sqlite),
            _ => Err(format!("Unknown repository type: {}", s)),
        }
    }
}

impl RepositoryType {
    /// Resolve the backend from `REPOSITORY_TYPE`, defaulting to Local.
    pub fn from_env() -> Self {
        std::env::var("REPOSITORY_TYPE")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::Local)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::File => "file",
            Self::Github => "github",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Factory for creating repository instances from configuration.
pub struct RepositoryFactory;

impl RepositoryFactory {
    /// Create a repository of the requested type.
    pub fn create(
        repo_type: RepositoryType,
        config: &ServiceConfig,
    ) -> StoreResult<Arc<dyn FullRepository>> {
        match repo_type {
            RepositoryType::Local => {
                #[cfg(feature = "local-repo")]
                {
                    Ok(Self::create_local())
                }
                #[cfg(not(feature = "local-repo"))]
                {
                    Err(crate::store::error::StoreError::configuration(
                        "local repository requires the local-repo feature",
                    ))
                }
            }
            RepositoryType::File => {
                let repo = FileRepository::new(&config.data_dir)?;
                Ok(Arc::new(repo) as Arc<dyn FullRepository>)
            }
            RepositoryType::Github => {
                let repo = GithubRepository::new(config.github_raw_base.clone(), config.cache_ttl)?;
                Ok(Arc::new(repo) as Arc<dyn FullRepository>)
            }
            RepositoryType::Sqlite => {
                #[cfg(feature = "sqlite-repo")]
                {
                    let repo = SqliteRepository::new(&config.history_db)?;
                    Ok(Arc::new(repo) as Arc<dyn FullRepository>)
                }
                #[cfg(not(feature = "sqlite-repo"))]
                {
                    Err(crate::store::error::StoreError::configuration(
                        "sqlite repository requires the sqlite-repo feature",
                    ))
                }
            }
        }
    }

    /// Create the in-memory repository.
    #[cfg(feature = "local-repo")]
    pub fn create_local() -> Arc<dyn FullRepository> {
        Arc::new(LocalRepository::new())
    }
}
