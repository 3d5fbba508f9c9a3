//! HR Bridge Core — shared domain abstractions.
//!
//! This crate defines the event model, the error taxonomy, and the trait
//! seams (event store, sync adapters, case-system client) that the rest of
//! the bridge depends on. It contains no infrastructure code.

pub mod case;
pub mod clock;
pub mod error;
pub mod event;
pub mod risk;
pub mod store;
pub mod sync;
