//! Tool execution backends and the invocation dispatcher

mod backend;
mod dispatch;

pub use backend::{BackendError, BackendResult, HttpBackend, MockBackend, MockMode, ToolBackend};
pub use dispatch::{DispatchError, Dispatcher, DEFAULT_CALL_TIMEOUT};
