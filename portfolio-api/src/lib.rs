//! # Portfolio API Server Library
//!
//! This library provides the core functionality for the portfolio API server.
//!
//! ## Modules
//!
//! - `app`: Application state, database bootstrap and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `graphql`: GraphQL schema and resolvers
//! - `routes`: HTTP route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod graphql;
pub mod routes;
