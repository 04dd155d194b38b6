//! Shared types, errors, and configuration for the PaidSearchNav analyzers.

pub mod config;
pub mod error;
pub mod types;

pub use error::{NavError, NavResult};
