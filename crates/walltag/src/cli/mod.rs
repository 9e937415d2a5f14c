//! Command implementations for the Walltag CLI.

pub mod config;
pub mod models;
pub mod tag;
