//! Authoritative in-memory catalog of servers, tools and enabled state
//!
//! The catalog is the single owner of [`ServerDescriptor`] entities. Callers
//! receive deep-copy snapshots and mutate only through catalog operations;
//! refresh merges never drop operator intent or delete servers silently.
//!
//! [`ServerDescriptor`]: crate::types::ServerDescriptor

mod store;

pub use store::{Catalog, CatalogError, CatalogResult, CatalogStatus, RefreshStats};
