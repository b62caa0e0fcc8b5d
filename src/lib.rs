//! # Dostupnost Backend
//!
//! Region availability backend for the mobile network monitoring client.
//!
//! This crate serves per-region base-station availability: a current
//! snapshot with two report texts (the base layer and the non-priority
//! technologies) plus aggregate counters, a per-region history log with a
//! write debounce, and login through an ordered credential verifier chain.
//! The REST API is exposed via axum.
//!
//! ## Architecture
//!
//! - [`api`]: core records shared by all layers (snapshots, history
//!   entries, credentials)
//! - [`regions`]: the static region table with macro-region grouping
//! - [`report`]: report text generation and stats extraction from
//!   base-station feed records
//! - [`store`]: repository pattern over the swappable backends (local,
//!   file, github raw content, sqlite)
//! - [`service`]: business rules — mock fallback, history debounce,
//!   forced refresh
//! - [`auth`]: the credential verifier chain (admin bypass, static user
//!   table, LDAP gateway)
//! - [`http`]: axum-based HTTP server and request handlers
//! - [`config`]: environment-first configuration with an optional TOML
//!   file

pub mod api;
pub mod auth;
pub mod config;
pub mod regions;
pub mod report;
pub mod service;
pub mod store;

#[cfg(feature = "http-server")]
pub mod http;
