#![forbid(unsafe_code)]

//! Overlay: popup placement, anchor highlighting, and the tour guide.
//!
//! This crate turns runtime state into something a host can draw. For the
//! current step it resolves the anchor through
//! [`AnchorResolver`](wayfinder_core::AnchorResolver), computes where the
//! popup goes, and keeps exactly one element highlighted on the host's
//! [`HighlightSurface`].

pub mod guide;
pub mod highlight;
pub mod placement;

pub use guide::{StepView, TourGuide};
#[cfg(any(test, feature = "test-helpers"))]
pub use highlight::{RecordingSurface, SurfaceOp};
pub use highlight::{
    HighlightSurface, HighlightTreatment, Highlighter, Pulse, Rgba, ScrollBehavior, ScrollBlock,
    ScrollOptions,
};
pub use placement::{Arrow, PlacementConfig, PopupPlacement, place_popup};
