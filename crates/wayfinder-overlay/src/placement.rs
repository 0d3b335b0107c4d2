#![forbid(unsafe_code)]

//! Popup placement relative to an anchor.
//!
//! # Invariants
//!
//! 1. `top`/`bottom` center the popup horizontally on the anchor;
//!    `left`/`right` center it vertically.
//! 2. `center` ignores the anchor and centers the popup in the viewport.
//! 3. The final origin is clamped to `[margin, viewport - popup - margin]`
//!    on each axis. When the viewport is too small for that range the lower
//!    bound wins, so the popup never starts off-screen.
//! 4. The arrow depends on the requested side only.
//!
//! Placement is a pure function of its inputs; callers recompute it on every
//! step activation and whenever the layout may have moved.

use wayfinder_core::{Point, Rect, Size};
use wayfinder_runtime::Placement;

/// Popup size and spacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementConfig {
    /// Fixed popup size.
    pub popup: Size,
    /// Distance between anchor and popup.
    pub gap: i32,
    /// Minimum distance between popup and viewport edge.
    pub margin: i32,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            popup: Size::new(320, 200),
            gap: 10,
            margin: 10,
        }
    }
}

impl PlacementConfig {
    #[must_use]
    pub fn popup(mut self, size: Size) -> Self {
        self.popup = size;
        self
    }

    #[must_use]
    pub fn gap(mut self, gap: i32) -> Self {
        self.gap = gap;
        self
    }

    #[must_use]
    pub fn margin(mut self, margin: i32) -> Self {
        self.margin = margin;
        self
    }
}

/// Pointer drawn on the popup edge facing the anchor, named by the
/// direction it points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    /// On the bottom edge; popup sits above the anchor.
    Down,
    /// On the top edge; popup sits below the anchor.
    Up,
    /// On the right edge; popup sits left of the anchor.
    Right,
    /// On the left edge; popup sits right of the anchor.
    Left,
}

impl Arrow {
    /// Arrow for a requested side, or `None` for centered popups.
    #[must_use]
    pub const fn for_placement(side: Placement) -> Option<Arrow> {
        match side {
            Placement::Top => Some(Self::Down),
            Placement::Bottom => Some(Self::Up),
            Placement::Left => Some(Self::Right),
            Placement::Right => Some(Self::Left),
            Placement::Center => None,
        }
    }

    #[must_use]
    pub const fn glyph(self) -> char {
        match self {
            Self::Down => '▼',
            Self::Up => '▲',
            Self::Right => '▶',
            Self::Left => '◀',
        }
    }
}

/// Computed popup position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopupPlacement {
    /// Top-left corner in viewport coordinates.
    pub origin: Point,
    pub size: Size,
    /// Side requested by the step.
    pub side: Placement,
    /// Whether the popup was positioned next to an anchor. `false` for
    /// centered steps and for steps whose anchor could not be resolved.
    pub anchored: bool,
    pub arrow: Option<Arrow>,
}

impl PopupPlacement {
    #[must_use]
    pub fn bounds(&self) -> Rect {
        Rect::at(self.origin, self.size)
    }
}

fn clamp_axis(value: i32, viewport: i32, popup: i32, margin: i32) -> i32 {
    value
        .min(viewport.saturating_sub(popup).saturating_sub(margin))
        .max(margin)
}

/// Place a popup next to `anchor` on `side`.
///
/// A missing anchor falls back to centered framing without an arrow. Offsets
/// saturate, so anchors far outside the viewport still clamp to the margin.
#[must_use]
pub fn place_popup(
    anchor: Option<Rect>,
    side: Placement,
    viewport: Size,
    config: &PlacementConfig,
) -> PopupPlacement {
    let popup = config.popup;
    let gap = config.gap;
    let half_w = popup.width / 2;
    let half_h = popup.height / 2;
    let frame = Rect::from_size(viewport).center();
    let centered = Point::new(frame.x.saturating_sub(half_w), frame.y.saturating_sub(half_h));

    let (raw, anchored) = match (anchor, side) {
        (Some(a), Placement::Top) => (
            Point::new(
                a.center().x.saturating_sub(half_w),
                a.y.saturating_sub(popup.height).saturating_sub(gap),
            ),
            true,
        ),
        (Some(a), Placement::Bottom) => (
            Point::new(
                a.center().x.saturating_sub(half_w),
                a.bottom().saturating_add(gap),
            ),
            true,
        ),
        (Some(a), Placement::Left) => (
            Point::new(
                a.x.saturating_sub(popup.width).saturating_sub(gap),
                a.center().y.saturating_sub(half_h),
            ),
            true,
        ),
        (Some(a), Placement::Right) => (
            Point::new(
                a.right().saturating_add(gap),
                a.center().y.saturating_sub(half_h),
            ),
            true,
        ),
        (_, Placement::Center) | (None, _) => (centered, false),
    };

    let origin = Point::new(
        clamp_axis(raw.x, viewport.width, popup.width, config.margin),
        clamp_axis(raw.y, viewport.height, popup.height, config.margin),
    );

    PopupPlacement {
        origin,
        size: popup,
        side,
        anchored,
        arrow: if anchored {
            Arrow::for_placement(side)
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size::new(1024, 768);

    fn place(anchor: Rect, side: Placement) -> PopupPlacement {
        place_popup(Some(anchor), side, VIEWPORT, &PlacementConfig::default())
    }

    #[test]
    fn bottom_near_viewport_edge_clamps_vertically() {
        let p = place(Rect::new(500, 700, 100, 20), Placement::Bottom);
        assert!(p.origin.y <= 768 - 200 - 10);
        assert_eq!(p.origin, Point::new(390, 558));
        assert_eq!(p.arrow, Some(Arrow::Up));
        assert!(p.anchored);
    }

    #[test]
    fn bottom_with_room_sits_below_with_gap() {
        let p = place(Rect::new(400, 100, 200, 40), Placement::Bottom);
        assert_eq!(p.origin, Point::new(340, 150));
    }

    #[test]
    fn top_sits_above_with_gap() {
        let p = place(Rect::new(400, 500, 200, 40), Placement::Top);
        assert_eq!(p.origin, Point::new(340, 290));
        assert_eq!(p.arrow, Some(Arrow::Down));
    }

    #[test]
    fn left_and_right_center_vertically() {
        let anchor = Rect::new(500, 300, 100, 60);
        let right = place(anchor, Placement::Right);
        assert_eq!(right.origin, Point::new(610, 230));
        assert_eq!(right.arrow, Some(Arrow::Left));

        let left = place(anchor, Placement::Left);
        assert_eq!(left.origin, Point::new(170, 230));
        assert_eq!(left.arrow, Some(Arrow::Right));
    }

    #[test]
    fn right_of_sidebar_clamps_to_top_margin() {
        let p = place(Rect::new(0, 0, 240, 60), Placement::Right);
        assert_eq!(p.origin, Point::new(250, 10));
    }

    #[test]
    fn left_of_leftmost_anchor_clamps_to_margin() {
        let p = place(Rect::new(20, 300, 50, 50), Placement::Left);
        assert_eq!(p.origin.x, 10);
    }

    #[test]
    fn center_ignores_anchor() {
        let p = place(Rect::new(0, 0, 10, 10), Placement::Center);
        assert_eq!(p.origin, Point::new(352, 284));
        assert!(!p.anchored);
        assert_eq!(p.arrow, None);
    }

    #[test]
    fn missing_anchor_falls_back_to_center() {
        let p = place_popup(None, Placement::Bottom, VIEWPORT, &PlacementConfig::default());
        assert_eq!(p.origin, Point::new(352, 284));
        assert_eq!(p.side, Placement::Bottom);
        assert!(!p.anchored);
        assert_eq!(p.arrow, None);
    }

    #[test]
    fn tiny_viewport_prefers_leading_margin() {
        let p = place_popup(
            Some(Rect::new(50, 50, 10, 10)),
            Placement::Bottom,
            Size::new(200, 150),
            &PlacementConfig::default(),
        );
        assert_eq!(p.origin, Point::new(10, 10));
    }

    #[test]
    fn custom_config_changes_spacing() {
        let config = PlacementConfig::default()
            .popup(Size::new(100, 50))
            .gap(4)
            .margin(0);
        let p = place_popup(
            Some(Rect::new(100, 100, 20, 20)),
            Placement::Right,
            VIEWPORT,
            &config,
        );
        assert_eq!(p.origin, Point::new(124, 85));
        assert_eq!(p.bounds(), Rect::new(124, 85, 100, 50));
    }

    #[test]
    fn anchors_near_integer_limits_saturate() {
        let far_right = place(Rect::new(i32::MAX - 100, 0, 1000, 10), Placement::Right);
        assert_eq!(far_right.origin, Point::new(694, 10));

        let far_above = place(Rect::new(400, i32::MIN + 5, 200, 40), Placement::Top);
        assert_eq!(far_above.origin, Point::new(340, 10));

        let far_left = place(Rect::new(i32::MIN, 300, 50, 50), Placement::Left);
        assert_eq!(far_left.origin.x, 10);
    }

    #[test]
    fn huge_popup_and_gap_do_not_overflow() {
        let config = PlacementConfig::default()
            .popup(Size::new(i32::MAX, i32::MAX))
            .gap(i32::MAX)
            .margin(i32::MAX);
        let p = place_popup(Some(Rect::new(10, 10, 10, 10)), Placement::Bottom, VIEWPORT, &config);
        assert_eq!(p.origin, Point::new(i32::MAX, i32::MAX));
    }

    #[test]
    fn arrow_depends_only_on_side() {
        assert_eq!(Arrow::for_placement(Placement::Top), Some(Arrow::Down));
        assert_eq!(Arrow::for_placement(Placement::Bottom), Some(Arrow::Up));
        assert_eq!(Arrow::for_placement(Placement::Left), Some(Arrow::Right));
        assert_eq!(Arrow::for_placement(Placement::Right), Some(Arrow::Left));
        assert_eq!(Arrow::for_placement(Placement::Center), None);
    }
}
