// Shared infrastructure
pub mod config;
pub mod error;
pub mod metrics;
pub mod postgres;
pub mod redis;
pub mod telemetry;

// Domain layer
pub mod auth;
pub mod directory;
pub mod notification;
pub mod store;

// Application layer
pub mod api;
pub mod server;
