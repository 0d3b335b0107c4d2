#![forbid(unsafe_code)]

//! Anchor highlighting.
//!
//! # Invariants
//!
//! 1. A [`Highlighter`] holds at most one highlighted element.
//! 2. Highlighting a new element clears the previous one first.
//! 3. Highlighting the element that is already highlighted is a no-op.
//! 4. Pulse opacity is deterministic given elapsed time.

use std::time::Duration;

use wayfinder_core::ElementId;

/// 8-bit RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    #[must_use]
    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }

    /// CSS notation, e.g. `rgba(59, 130, 246, 0.50)`.
    #[must_use]
    pub fn to_css(self) -> String {
        if self.a == 255 {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                self.r,
                self.g,
                self.b,
                f32::from(self.a) / 255.0
            )
        }
    }
}

/// Border opacity animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pulse {
    pub period: Duration,
    /// Opacity at mid-period; the cycle starts and ends at 1.0.
    pub min_opacity: f32,
}

impl Default for Pulse {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(2),
            min_opacity: 0.5,
        }
    }
}

impl Pulse {
    /// Opacity after `elapsed`, following a linear 1 → min → 1 cycle.
    #[must_use]
    pub fn opacity_at(&self, elapsed: Duration) -> f32 {
        let period = self.period.as_micros();
        if period == 0 {
            return 1.0;
        }
        let phase = (elapsed.as_micros() % period) as f32 / period as f32;
        let depth = if phase < 0.5 {
            phase * 2.0
        } else {
            (1.0 - phase) * 2.0
        };
        let min = self.min_opacity.clamp(0.0, 1.0);
        1.0 - depth * (1.0 - min)
    }
}

/// Visual treatment applied to the current anchor.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightTreatment {
    /// Stacking order lifting the anchor above the dimmed overlay.
    pub z_index: i32,
    pub ring_color: Rgba,
    pub ring_width: u16,
    pub corner_radius: u16,
    pub tint: Rgba,
    pub border_color: Rgba,
    pub border_width: u16,
    /// Distance between the anchor's box and the pulsing border.
    pub border_offset: u16,
    pub pulse: Option<Pulse>,
    pub transition: Duration,
}

impl Default for HighlightTreatment {
    fn default() -> Self {
        Self {
            z_index: 9997,
            ring_color: Rgba::rgba(59, 130, 246, 128),
            ring_width: 4,
            corner_radius: 4,
            tint: Rgba::rgba(59, 130, 246, 26),
            border_color: Rgba::rgb(59, 130, 246),
            border_width: 2,
            border_offset: 4,
            pulse: Some(Pulse::default()),
            transition: Duration::from_millis(300),
        }
    }
}

impl HighlightTreatment {
    #[must_use]
    pub fn without_pulse(mut self) -> Self {
        self.pulse = None;
        self
    }

    #[must_use]
    pub fn z_index(mut self, z_index: i32) -> Self {
        self.z_index = z_index;
        self
    }

    /// Stylesheet implementing the treatment for `class`, for DOM hosts that
    /// highlight by toggling a class name.
    #[must_use]
    pub fn css_rules(&self, class: &str) -> String {
        let mut css = format!(
            ".{class} {{\n  position: relative !important;\n  z-index: {} !important;\n  \
             box-shadow: 0 0 0 {}px {} !important;\n  border-radius: {}px !important;\n  \
             background-color: {} !important;\n  transition: all {}ms ease !important;\n}}\n",
            self.z_index,
            self.ring_width,
            self.ring_color.to_css(),
            self.corner_radius,
            self.tint.to_css(),
            self.transition.as_millis(),
        );
        let animation = match self.pulse {
            Some(pulse) => format!(
                "  animation: {class}-pulse {}ms infinite !important;\n",
                pulse.period.as_millis()
            ),
            None => String::new(),
        };
        css.push_str(&format!(
            ".{class}::after {{\n  content: '' !important;\n  position: absolute !important;\n  \
             inset: -{}px !important;\n  border: {}px solid {} !important;\n  \
             border-radius: {}px !important;\n  pointer-events: none !important;\n{animation}}}\n",
            self.border_offset,
            self.border_width,
            self.border_color.to_css(),
            self.corner_radius + self.border_width,
        ));
        if let Some(pulse) = self.pulse {
            css.push_str(&format!(
                "@keyframes {class}-pulse {{\n  0%, 100% {{ opacity: 1; }}\n  50% {{ opacity: {}; }}\n}}\n",
                pulse.min_opacity
            ));
        }
        css
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBehavior {
    #[default]
    Smooth,
    Instant,
}

/// Vertical alignment after scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollBlock {
    Start,
    #[default]
    Center,
    End,
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScrollOptions {
    pub behavior: ScrollBehavior,
    pub block: ScrollBlock,
}

/// Host-side capability for decorating elements.
pub trait HighlightSurface {
    fn apply(&mut self, element: ElementId, treatment: &HighlightTreatment);
    fn clear(&mut self, element: ElementId);
    fn scroll_into_view(&mut self, element: ElementId, options: ScrollOptions);
}

impl<S: HighlightSurface + ?Sized> HighlightSurface for &mut S {
    fn apply(&mut self, element: ElementId, treatment: &HighlightTreatment) {
        (**self).apply(element, treatment);
    }

    fn clear(&mut self, element: ElementId) {
        (**self).clear(element);
    }

    fn scroll_into_view(&mut self, element: ElementId, options: ScrollOptions) {
        (**self).scroll_into_view(element, options);
    }
}

/// Tracks the highlighted element and keeps it unique.
#[derive(Debug, Clone)]
pub struct Highlighter {
    treatment: HighlightTreatment,
    /// `None` disables scrolling on activation.
    scroll: Option<ScrollOptions>,
    current: Option<ElementId>,
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new(HighlightTreatment::default())
    }
}

impl Highlighter {
    #[must_use]
    pub fn new(treatment: HighlightTreatment) -> Self {
        Self {
            treatment,
            scroll: Some(ScrollOptions::default()),
            current: None,
        }
    }

    #[must_use]
    pub fn scroll(mut self, scroll: Option<ScrollOptions>) -> Self {
        self.scroll = scroll;
        self
    }

    #[must_use]
    pub fn treatment(&self) -> &HighlightTreatment {
        &self.treatment
    }

    #[must_use]
    pub fn current(&self) -> Option<ElementId> {
        self.current
    }

    /// Move the highlight to `element`. Returns `false` if it already held it.
    pub fn highlight<S: HighlightSurface + ?Sized>(
        &mut self,
        surface: &mut S,
        element: ElementId,
    ) -> bool {
        if self.current == Some(element) {
            return false;
        }
        self.clear(surface);
        surface.apply(element, &self.treatment);
        if let Some(options) = self.scroll {
            surface.scroll_into_view(element, options);
        }
        self.current = Some(element);
        tracing::trace!(target: "wayfinder.overlay", element = %element, "highlight applied");
        true
    }

    /// Remove the highlight, returning the element that held it.
    pub fn clear<S: HighlightSurface + ?Sized>(&mut self, surface: &mut S) -> Option<ElementId> {
        let element = self.current.take()?;
        surface.clear(element);
        tracing::trace!(target: "wayfinder.overlay", element = %element, "highlight cleared");
        Some(element)
    }
}

// ---------------------------------------------------------------------------
// Test helper
// ---------------------------------------------------------------------------

/// Operation recorded by [`RecordingSurface`].
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceOp {
    Apply(ElementId),
    Clear(ElementId),
    Scroll(ElementId),
}

/// Surface that records every call and tracks which elements are decorated.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    pub ops: Vec<SurfaceOp>,
    highlighted: std::collections::BTreeSet<ElementId>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl RecordingSurface {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Elements currently carrying the treatment.
    #[must_use]
    pub fn highlighted(&self) -> Vec<ElementId> {
        self.highlighted.iter().copied().collect()
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl HighlightSurface for RecordingSurface {
    fn apply(&mut self, element: ElementId, _treatment: &HighlightTreatment) {
        self.ops.push(SurfaceOp::Apply(element));
        self.highlighted.insert(element);
    }

    fn clear(&mut self, element: ElementId) {
        self.ops.push(SurfaceOp::Clear(element));
        self.highlighted.remove(&element);
    }

    fn scroll_into_view(&mut self, element: ElementId, _options: ScrollOptions) {
        self.ops.push(SurfaceOp::Scroll(element));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_treatment_matches_dashboard_style() {
        let t = HighlightTreatment::default();
        assert_eq!(t.z_index, 9997);
        assert_eq!(t.ring_color.to_css(), "rgba(59, 130, 246, 0.50)");
        assert_eq!(t.tint.to_css(), "rgba(59, 130, 246, 0.10)");
        assert_eq!(t.border_color.to_css(), "#3B82F6");
        assert_eq!(t.pulse.map(|p| p.period), Some(Duration::from_secs(2)));
    }

    #[test]
    fn pulse_cycle_is_deterministic() {
        let pulse = Pulse::default();
        assert_eq!(pulse.opacity_at(Duration::ZERO), 1.0);
        assert!((pulse.opacity_at(Duration::from_millis(1000)) - 0.5).abs() < 1e-6);
        assert!((pulse.opacity_at(Duration::from_millis(500)) - 0.75).abs() < 1e-6);
        assert_eq!(
            pulse.opacity_at(Duration::from_millis(2500)),
            pulse.opacity_at(Duration::from_millis(500))
        );
    }

    #[test]
    fn zero_period_pulse_is_opaque() {
        let pulse = Pulse {
            period: Duration::ZERO,
            min_opacity: 0.2,
        };
        assert_eq!(pulse.opacity_at(Duration::from_millis(123)), 1.0);
    }

    #[test]
    fn highlighter_keeps_one_element() {
        let mut surface = RecordingSurface::new();
        let mut hl = Highlighter::default();

        assert!(hl.highlight(&mut surface, ElementId(1)));
        assert!(hl.highlight(&mut surface, ElementId(2)));
        assert_eq!(surface.highlighted(), vec![ElementId(2)]);
        assert_eq!(
            surface.ops,
            vec![
                SurfaceOp::Apply(ElementId(1)),
                SurfaceOp::Scroll(ElementId(1)),
                SurfaceOp::Clear(ElementId(1)),
                SurfaceOp::Apply(ElementId(2)),
                SurfaceOp::Scroll(ElementId(2)),
            ]
        );
    }

    #[test]
    fn rehighlighting_same_element_is_noop() {
        let mut surface = RecordingSurface::new();
        let mut hl = Highlighter::default();
        hl.highlight(&mut surface, ElementId(7));
        let ops = surface.ops.len();
        assert!(!hl.highlight(&mut surface, ElementId(7)));
        assert_eq!(surface.ops.len(), ops);
    }

    #[test]
    fn clear_without_highlight_is_noop() {
        let mut surface = RecordingSurface::new();
        let mut hl = Highlighter::default();
        assert_eq!(hl.clear(&mut surface), None);
        assert!(surface.ops.is_empty());
    }

    #[test]
    fn scrolling_can_be_disabled() {
        let mut surface = RecordingSurface::new();
        let mut hl = Highlighter::default().scroll(None);
        hl.highlight(&mut surface, ElementId(3));
        assert_eq!(surface.ops, vec![SurfaceOp::Apply(ElementId(3))]);
    }

    #[test]
    fn css_rules_cover_treatment() {
        let css = HighlightTreatment::default().css_rules("tour-highlight");
        assert!(css.contains(".tour-highlight {"));
        assert!(css.contains("z-index: 9997"));
        assert!(css.contains("box-shadow: 0 0 0 4px rgba(59, 130, 246, 0.50)"));
        assert!(css.contains("border: 2px solid #3B82F6"));
        assert!(css.contains("animation: tour-highlight-pulse 2000ms infinite"));
        assert!(css.contains("50% { opacity: 0.5; }"));

        let still = HighlightTreatment::default()
            .without_pulse()
            .css_rules("tour-highlight");
        assert!(!still.contains("@keyframes"));
    }
}
