//! changelint: surface static-analysis findings on the lines a change touched
//! (library crate).
//!
//! Re-exports public modules for integration tests and external use.

pub mod config;
pub mod constants;
pub mod diff;
pub mod env;
pub mod filter;
pub mod github;
pub mod identity;
pub mod index;
pub mod models;
pub mod output;
pub mod publish;
pub mod report;
pub mod runner;
