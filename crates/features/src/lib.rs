//! Derived analytical columns for the retail sales pipeline.
//!
//! This crate handles:
//! - City extraction from purchase addresses
//! - Month, Sales, Hour and Minute derivation

pub mod city;
pub mod augmenter;

pub use city::parse_city;
pub use augmenter::Augmenter;
