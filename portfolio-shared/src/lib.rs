//! # Portfolio Shared Library
//!
//! This crate contains the database bootstrap used by both the portfolio API
//! server and the standalone migration runner.
//!
//! ## Module Organization
//!
//! - `config`: Database settings loaded from the environment
//! - `db`: Connection pool provisioning and the SQL file migration runner
//! - `models`: Profile model and profile sources

pub mod config;
pub mod db;
pub mod models;

/// Current version of the portfolio shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
