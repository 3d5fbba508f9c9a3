//! Shared test mocks and utilities for the HR Bridge.

mod adapter;
mod case;
mod clock;
mod store;

pub use adapter::{RecordingSyncAdapter, SlowSyncAdapter, StaticSyncAdapter};
pub use case::RecordingCaseClient;
pub use clock::FixedClock;
pub use store::InMemoryEventStore;
