/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `root`: Plain-text liveness page
/// - `health`: Health check endpoint
/// - `graphql`: GraphQL endpoint and GraphiQL playground
/// - `profile`: REST profile endpoints

pub mod graphql;
pub mod health;
pub mod profile;
pub mod root;
