//! Foundation types for mill.
//!
//! This crate contains the types shared by all mill crates: the error enum,
//! the `Result` alias, and the tool configuration.

pub mod config;
pub mod error;
