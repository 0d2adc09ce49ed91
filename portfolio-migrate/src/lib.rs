//! # Portfolio Migration Runner Library
//!
//! Command-line surface of the one-shot migration runner.
//!
//! ## Modules
//!
//! - `cli`: Argument parsing and the migrate command

pub mod cli;
