//! Core types for the server/tool catalog and dispatch engine
//!
//! This module contains all the shared types used across components.

mod cancellation;
mod envelope;
mod invocation;
mod schema;
mod server;

pub use cancellation::CancellationToken;
pub use envelope::ResponseEnvelope;
pub use invocation::{InvocationError, InvocationOutcome, InvocationRecord, InvocationResult};
pub use schema::{ArgumentSchema, ParamSpec, ParamType};
pub use server::{DescriptorOrigin, ServerDescriptor, ServerFilter, ToolDescriptor};
