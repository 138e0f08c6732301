//! Remote registry acquisition
//!
//! The [`RegistryClient`] fetches server descriptors from the HTTP registry
//! endpoint; [`mock`] holds the fixed dataset the refresh orchestrator
//! substitutes when the registry is unreachable and the mock-data policy is
//! enabled. The fallback decision lives with the caller, never in here.

mod client;
pub mod mock;

pub use client::{RegistryClient, RegistryError, RegistryResult, DEFAULT_FETCH_TIMEOUT};
pub use mock::{mock_registry_servers, MOCK_SERVER_NAMES};
