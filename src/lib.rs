//! Library crate for the blind timer server, exposing modules for the binary and integration tests.

/// Runtime configuration loaded from disk and the environment.
pub mod config;
/// Persistence: stored records and timer stores.
pub mod dao;
/// View-models, forms and display formatting.
pub mod dto;
/// Service and HTTP error types.
pub mod error;
/// HTML templates.
pub mod render;
/// HTTP routes.
pub mod routes;
/// Use-cases behind the routes.
pub mod services;
/// Timer model, sequencer and shared application state.
pub mod state;
