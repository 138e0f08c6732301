//! Logging abstractions for runtime-agnostic logging

mod traits;
mod noop;
mod console;
mod file;

pub use traits::Logger;
pub use noop::NoOpLogger;
pub use console::ConsoleLogger;
pub use file::{FileLogger, LogLevel};
