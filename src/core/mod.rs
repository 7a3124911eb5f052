//! Core building blocks: configuration and error types.

pub mod config;
pub mod errors;
