//! Repository implementations.
//!
//! - `local`: in-memory backend for unit testing and local development
//! - `file`: flat JSON files under a data directory
//! - `github`: read-only raw-content host with a TTL cache
//! - `sqlite`: Diesel-backed history cache (feature `sqlite-repo`)

pub(crate) mod encoding;
pub mod file;
pub mod github;
#[cfg(feature = "local-repo")]
pub mod local;
#[cfg(feature = "sqlite-repo")]
pub mod sqlite;

pub use file::FileRepository;
pub use github::GithubRepository;
#[cfg(feature = "local-repo")]
pub use local::LocalRepository;
#[cfg(feature = "sqlite-repo")]
pub use sqlite::SqliteRepository;
