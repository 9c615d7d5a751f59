//! Core abstractions for graph processing
//!
//! Data types, the store and layout traits the sync controller is generic
//! over, the error type, configuration and logging setup.

mod config;
mod error;
mod layout;
pub mod logging;
mod store;
mod types;

pub use config::*;
pub use error::*;
pub use layout::*;
pub use logging::*;
pub use store::*;
pub use types::*;
