//! Route modules, one per surface area.

pub mod events;
pub mod health;
pub mod metrics;
pub mod pega;
pub mod webhook;
