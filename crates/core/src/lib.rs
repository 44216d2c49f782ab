//! Core types and configuration for the retail sales reporting pipeline.
//!
//! This crate provides shared types used across all other crates:
//! - Order line types (raw, cleaned, augmented)
//! - Configuration structures
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::Config;
pub use error::{Error, Result};
pub use types::*;
