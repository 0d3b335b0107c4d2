#![forbid(unsafe_code)]

//! Runtime: tour catalog, navigation state machine, and completion tracking.
//!
//! # Role in Wayfinder
//! `wayfinder-runtime` decides *what* the user is looking at: which tour is
//! active, which step is current, and which tours are done. It knows nothing
//! about geometry or the host view; `wayfinder-overlay` turns its state into
//! popup placement and highlights.
//!
//! # Primary responsibilities
//! - **TourCatalog**: immutable tour definitions, grouped by category.
//! - **TourRuntime**: `Idle → Running → Idle` state machine with progress
//!   queries. Navigation mistakes are no-ops, never errors.
//! - **ProgressSink / CompletionStore**: explicit persistence collaborators
//!   notified on every state-changing transition.

pub mod builtin;
pub mod catalog;
pub mod runtime;
pub mod sink;
pub mod store;

pub use catalog::{
    CatalogError, CategoryGroup, Placement, StepAction, Tour, TourCatalog, TourCategory, TourStep,
};
pub use runtime::{
    CallToAction, EndReason, StepChangeReason, TourEvent, TourRuntime, TourStatus,
};
pub use sink::{PersistentProgress, ProgressSink};
pub use store::{
    CompletionRecord, CompletionStore, FileStore, MemoryStore, StoreError, StoreResult,
};
