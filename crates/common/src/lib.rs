//! Shared types, config, errors, and provider traits for ripplecast.

pub mod config;
pub mod error;
pub mod providers;
pub mod types;

pub use config::SimulationConfig;
pub use error::Error;
pub use types::*;

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, Error>;
