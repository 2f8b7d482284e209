pub mod api;
pub mod boundary;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod scheduling;
pub mod services;
pub mod state;
pub mod store;
