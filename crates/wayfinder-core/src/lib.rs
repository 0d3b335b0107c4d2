#![forbid(unsafe_code)]

//! Core: geometry primitives and anchor resolution.
//!
//! # Role in Wayfinder
//! `wayfinder-core` is the boundary between the tour engine and whatever
//! surface hosts it. It owns the integer viewport geometry used by popup
//! placement and the [`AnchorResolver`] capability through which the host
//! view turns a step's target selector into an on-screen element.
//!
//! # How it fits in the system
//! `wayfinder-runtime` never touches geometry. `wayfinder-overlay` consumes
//! [`Rect`], [`Size`] and [`AnchorResolver`] to position popups and apply
//! highlights. Hosts implement [`AnchorResolver`]; tests and the demo use
//! [`StaticLayout`].

pub mod anchor;
pub mod geometry;

pub use anchor::{Anchor, AnchorResolver, ElementId, LayoutEntry, StaticLayout};
pub use geometry::{Point, Rect, Size};
