#![forbid(unsafe_code)]

//! Anchor resolution.
//!
//! A tour step names its UI location with a selector string. The host view
//! owns the real element tree, so the engine asks it, through
//! [`AnchorResolver`], for the element a selector matches and where that
//! element currently sits in the viewport.
//!
//! # Invariants
//!
//! 1. Resolution is a pure query: it never mutates the host.
//! 2. A selector that matches nothing yields `None`, never an error.
//! 3. When several elements match, the resolver returns the first one in
//!    document order.

use crate::geometry::{Rect, Size};

/// Opaque handle to a host element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementId(pub u64);

impl std::fmt::Display for ElementId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A concrete on-screen element matched by a selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub element: ElementId,
    /// Bounding box in viewport coordinates at the time of resolution.
    pub bounds: Rect,
}

/// Capability supplied by the host view layer.
pub trait AnchorResolver {
    /// Resolve a target selector to an element, or `None` if nothing matches.
    fn resolve(&self, target: &str) -> Option<Anchor>;

    /// Current viewport size.
    fn viewport(&self) -> Size;
}

impl<R: AnchorResolver + ?Sized> AnchorResolver for &R {
    fn resolve(&self, target: &str) -> Option<Anchor> {
        (**self).resolve(target)
    }

    fn viewport(&self) -> Size {
        (**self).viewport()
    }
}

/// One selector → bounds entry of a [`StaticLayout`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutEntry {
    pub selector: String,
    pub bounds: Rect,
}

/// Fixed selector → bounding box table.
///
/// Stands in for a real rendering surface in tests and in the demo. Element
/// ids are assigned by insertion order, so the first entry is `ElementId(0)`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StaticLayout {
    viewport: Size,
    #[cfg_attr(feature = "serde", serde(default))]
    elements: Vec<LayoutEntry>,
}

impl StaticLayout {
    /// Create an empty layout for a viewport.
    #[must_use]
    pub fn new(viewport: Size) -> Self {
        Self {
            viewport,
            elements: Vec::new(),
        }
    }

    /// Add an element.
    #[must_use]
    pub fn with(mut self, selector: impl Into<String>, bounds: Rect) -> Self {
        self.insert(selector, bounds);
        self
    }

    /// Add an element, or move it if the selector is already present.
    pub fn insert(&mut self, selector: impl Into<String>, bounds: Rect) {
        let selector = selector.into();
        if let Some(entry) = self.elements.iter_mut().find(|e| e.selector == selector) {
            entry.bounds = bounds;
        } else {
            self.elements.push(LayoutEntry { selector, bounds });
        }
    }

    /// Remove an element. Ids of later elements shift down by one.
    pub fn remove(&mut self, selector: &str) -> Option<Rect> {
        let idx = self.elements.iter().position(|e| e.selector == selector)?;
        Some(self.elements.remove(idx).bounds)
    }

    /// Shift every element vertically, e.g. to simulate scrolling by `dy`.
    pub fn scroll_by(&mut self, dy: i32) {
        for entry in &mut self.elements {
            entry.bounds.y = entry.bounds.y.saturating_sub(dy);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}

impl AnchorResolver for StaticLayout {
    fn resolve(&self, target: &str) -> Option<Anchor> {
        self.elements
            .iter()
            .enumerate()
            .find(|(_, e)| e.selector == target)
            .map(|(idx, e)| Anchor {
                element: ElementId(idx as u64),
                bounds: e.bounds,
            })
    }

    fn viewport(&self) -> Size {
        self.viewport
    }
}
