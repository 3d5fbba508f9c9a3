//! Reqwest-backed client for the Pega case-management REST API.

pub mod client;
pub mod config;

pub use client::PegaClient;
pub use config::{PegaConfig, PegaCredentials};
