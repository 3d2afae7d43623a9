//! Shared types, error definitions, and the hook input payload used across
//! all skillcue crates.

pub mod error;
pub mod hooks;

pub use error::{Error, FromMessage, Result};
