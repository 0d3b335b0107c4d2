#![forbid(unsafe_code)]

//! The tour guide: runtime state projected onto a host view.
//!
//! [`TourGuide`] owns a [`TourRuntime`] and re-syncs the overlay after every
//! transition: it resolves the current step's anchor, moves the highlight and
//! recomputes popup placement. Hosts render [`TourGuide::view`] and forward
//! button presses to the navigation methods.
//!
//! Every step highlights its target when it resolves. Centered steps still
//! ignore the anchor for placement. A target covering the whole viewport
//! (the page body) is treated as no anchor.

use wayfinder_core::{Anchor, AnchorResolver, Rect};
use wayfinder_runtime::{
    Placement, ProgressSink, StepAction, TourEvent, TourRuntime, TourStatus,
};

use crate::highlight::{HighlightSurface, Highlighter};
use crate::placement::{PlacementConfig, PopupPlacement, place_popup};

/// Everything a popup card needs to render the current step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepView {
    pub tour_id: String,
    pub tour_name: String,
    pub step_id: String,
    pub step_index: usize,
    pub step_count: usize,
    pub title: String,
    pub content: String,
    pub action: Option<StepAction>,
    pub action_text: Option<String>,
    /// Highlighted anchor, `None` for missing or page-sized targets.
    pub anchor: Option<Anchor>,
    pub placement: PopupPlacement,
}

impl StepView {
    /// `"Step 2 of 5"`.
    #[must_use]
    pub fn progress_label(&self) -> String {
        format!("Step {} of {}", self.step_index + 1, self.step_count)
    }

    #[must_use]
    pub fn can_go_back(&self) -> bool {
        self.step_index > 0
    }

    #[must_use]
    pub fn is_last(&self) -> bool {
        self.step_index + 1 >= self.step_count
    }

    /// Label of the forward button.
    #[must_use]
    pub fn next_label(&self) -> &'static str {
        if self.is_last() { "Complete" } else { "Next" }
    }
}

/// Drives a [`TourRuntime`] against a host's anchors and highlight surface.
#[derive(Debug)]
pub struct TourGuide<R, S> {
    runtime: TourRuntime,
    resolver: R,
    surface: S,
    highlighter: Highlighter,
    placement: PlacementConfig,
    view: Option<StepView>,
}

impl<R: AnchorResolver, S: HighlightSurface> TourGuide<R, S> {
    #[must_use]
    pub fn new(runtime: TourRuntime, resolver: R, surface: S) -> Self {
        let mut guide = Self {
            runtime,
            resolver,
            surface,
            highlighter: Highlighter::default(),
            placement: PlacementConfig::default(),
            view: None,
        };
        guide.sync();
        guide
    }

    #[must_use]
    pub fn with_placement(mut self, placement: PlacementConfig) -> Self {
        self.placement = placement;
        self.sync();
        self
    }

    /// Replace the highlighter, clearing whatever the old one decorated.
    #[must_use]
    pub fn with_highlight(mut self, highlighter: Highlighter) -> Self {
        self.highlighter.clear(&mut self.surface);
        self.highlighter = highlighter;
        self.sync();
        self
    }

    #[must_use]
    pub fn runtime(&self) -> &TourRuntime {
        &self.runtime
    }

    #[must_use]
    pub fn resolver(&self) -> &R {
        &self.resolver
    }

    /// Mutable access to the resolver. Call [`refresh`](Self::refresh)
    /// afterwards if the layout changed.
    pub fn resolver_mut(&mut self) -> &mut R {
        &mut self.resolver
    }

    #[must_use]
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the host surface. Decorations applied directly
    /// are not tracked by the guide.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    #[must_use]
    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }

    pub fn subscribe(&mut self, sink: Box<dyn ProgressSink>) {
        self.runtime.subscribe(sink);
    }

    #[must_use]
    pub fn status(&self, tour_id: &str) -> TourStatus {
        self.runtime.status(tour_id)
    }

    // --- Navigation --------------------------------------------------------

    pub fn start(&mut self, tour_id: &str) -> Option<TourEvent> {
        let event = self.runtime.start(tour_id);
        self.sync_if(event)
    }

    pub fn next(&mut self) -> Option<TourEvent> {
        let event = self.runtime.next();
        self.sync_if(event)
    }

    pub fn previous(&mut self) -> Option<TourEvent> {
        let event = self.runtime.previous();
        self.sync_if(event)
    }

    pub fn go_to_step(&mut self, index: usize) -> Option<TourEvent> {
        let event = self.runtime.go_to_step(index);
        self.sync_if(event)
    }

    pub fn stop(&mut self) -> Option<TourEvent> {
        let event = self.runtime.stop();
        self.sync_if(event)
    }

    /// Dismiss the tour. The highlight is removed before runtime state is
    /// cleared, so no decorated element outlives the tour.
    pub fn skip(&mut self) -> Option<TourEvent> {
        if self.runtime.is_active() {
            self.highlighter.clear(&mut self.surface);
        }
        let event = self.runtime.skip();
        self.sync_if(event)
    }

    /// Re-resolve the anchor and recompute placement, e.g. after a resize or
    /// scroll.
    pub fn refresh(&mut self) {
        self.sync();
    }

    /// The current step, or `None` while idle.
    #[must_use]
    pub fn view(&self) -> Option<&StepView> {
        self.view.as_ref()
    }

    fn sync_if(&mut self, event: Option<TourEvent>) -> Option<TourEvent> {
        if event.is_some() {
            self.sync();
        }
        event
    }

    fn sync(&mut self) {
        let (Some(tour), Some(index)) = (
            self.runtime.active_tour(),
            self.runtime.current_step_index(),
        ) else {
            self.highlighter.clear(&mut self.surface);
            self.view = None;
            return;
        };
        let Some(step) = tour.step(index) else {
            self.highlighter.clear(&mut self.surface);
            self.view = None;
            return;
        };

        let viewport = self.resolver.viewport();
        let anchor = match self.resolver.resolve(&step.target) {
            // The page root frames the whole screen; there is nothing to lift.
            Some(a)
                if !viewport.is_empty()
                    && a.bounds.contains_rect(&Rect::from_size(viewport)) =>
            {
                None
            }
            Some(a) => Some(a),
            None if step.position == Placement::Center => {
                tracing::debug!(
                    target: "wayfinder.overlay",
                    tour_id = %tour.id(),
                    step_id = %step.id,
                    selector = %step.target,
                    "centered step target not found"
                );
                None
            }
            None => {
                tracing::warn!(
                    target: "wayfinder.overlay",
                    tour_id = %tour.id(),
                    step_id = %step.id,
                    selector = %step.target,
                    "tour anchor not found; centering popup"
                );
                None
            }
        };

        match anchor {
            Some(a) => {
                self.highlighter.highlight(&mut self.surface, a.element);
            }
            None => {
                self.highlighter.clear(&mut self.surface);
            }
        }

        let placement = place_popup(
            anchor.map(|a| a.bounds),
            step.position,
            viewport,
            &self.placement,
        );

        self.view = Some(StepView {
            tour_id: tour.id().to_string(),
            tour_name: tour.name().to_string(),
            step_id: step.id.clone(),
            step_index: index,
            step_count: tour.step_count(),
            title: step.title.clone(),
            content: step.content.clone(),
            action: step.action,
            action_text: step.action_text.clone(),
            anchor,
            placement,
        });
    }
}
