//! Storage module for region snapshots and availability history.
//!
//! The module follows the Repository pattern: handlers and the service
//! layer talk to the [`FullRepository`] trait, and the concrete backend
//! (in-memory, JSON files on disk, raw GitHub content or SQLite) is
//! selected at startup through the [`factory`].
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  HTTP handlers (http::handlers)                         │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service layer (service) - debounce, mock fallback      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository traits (repository.rs)                      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────┬───┴──────┬───────────┬──────────┐
//!     │  local    │  file    │  github   │  sqlite  │
//!     └───────────┴──────────┴───────────┴──────────┘
//! ```

#[cfg(not(any(feature = "sqlite-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod cache;
pub mod error;
pub mod factory;
pub mod repositories;
pub mod repository;

pub use cache::TtlCache;
pub use error::{ErrorContext, StoreError, StoreResult};
pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::{FileRepository, GithubRepository};
#[cfg(feature = "local-repo")]
pub use repositories::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use repositories::SqliteRepository;
pub use repository::{FullRepository, HistoryRepository, SnapshotRepository};

use anyhow::{Context, Result};
use std::sync::{Arc, OnceLock};

use crate::config::ServiceConfig;

/// Global repository instance initialized once per process.
static REPOSITORY: OnceLock<Arc<dyn FullRepository>> = OnceLock::new();

/// Initialize the global repository singleton.
///
/// The backend is chosen from the `REPOSITORY_TYPE` environment variable
/// (see [`RepositoryType::from_env`]); the rest of the configuration is
/// taken from `config`. Calling this twice is a no-op.
pub fn init_repository(config: &ServiceConfig) -> Result<()> {
    if REPOSITORY.get().is_some() {
        return Ok(());
    }

    let repo_type = RepositoryType::from_env();
    let repo = RepositoryFactory::create(repo_type, config)
        .map_err(|e| anyhow::Error::msg(e.to_string()))?;
    let _ = REPOSITORY.set(repo);
    Ok(())
}

/// Get a reference to the global repository instance.
pub fn get_repository() -> Result<&'static Arc<dyn FullRepository>> {
    if REPOSITORY.get().is_none() {
        let config = ServiceConfig::load().unwrap_or_default();
        let _ = init_repository(&config);
    }

    REPOSITORY
        .get()
        .context("Repository not initialized. Call init_repository() first.")
}
