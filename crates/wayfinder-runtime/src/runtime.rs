#![forbid(unsafe_code)]

//! Tour navigation state machine.
//!
//! ```text
//!            start(id)                 next() on last step
//!   Idle ─────────────────▶ Running ─────────────────────▶ Idle + completion
//!    ▲                      │  ▲ next/previous/go_to_step
//!    │   stop() / skip()    │  └──┘
//!    └──────────────────────┘
//! ```
//!
//! # Invariants
//!
//! 1. While a tour is active, `current_step_index < step_count`.
//! 2. At most one tour is active. Starting another replaces it.
//! 3. Only `next()` on the last step records a completion.
//! 4. Navigation with an unknown tour id or an out-of-range index changes
//!    nothing and returns `None`.
//! 5. Every transition that changes state returns exactly one [`TourEvent`]
//!    and notifies the registered [`ProgressSink`]s.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use crate::catalog::{Tour, TourCatalog, TourStep};
use crate::sink::ProgressSink;
use crate::store::CompletionRecord;

/// Why the current step changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepChangeReason {
    Next,
    Previous,
    Jump,
}

/// Why a tour ended without completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Closed programmatically.
    Stopped,
    /// Dismissed by the user.
    Skipped,
}

/// Result of a state-changing transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TourEvent {
    Started {
        tour_id: String,
        /// Tour that was active before and got replaced.
        replaced: Option<String>,
    },
    StepChanged {
        tour_id: String,
        from: usize,
        to: usize,
        reason: StepChangeReason,
    },
    Completed {
        tour_id: String,
    },
    Ended {
        tour_id: String,
        reason: EndReason,
    },
}

impl TourEvent {
    #[must_use]
    pub fn tour_id(&self) -> &str {
        match self {
            Self::Started { tour_id, .. }
            | Self::StepChanged { tour_id, .. }
            | Self::Completed { tour_id }
            | Self::Ended { tour_id, .. } => tour_id,
        }
    }

    /// Whether the runtime is idle after this event.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed { .. } | Self::Ended { .. })
    }
}

/// Per-tour status shown by the tour selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TourStatus {
    NotStarted,
    InProgress { percent: u8 },
    Completed,
}

impl TourStatus {
    #[must_use]
    pub fn percent(self) -> u8 {
        match self {
            Self::NotStarted => 0,
            Self::InProgress { percent } => percent,
            Self::Completed => 100,
        }
    }

    #[must_use]
    pub fn call_to_action(self) -> CallToAction {
        match self {
            Self::NotStarted => CallToAction::Start,
            Self::InProgress { .. } => CallToAction::Continue,
            Self::Completed => CallToAction::Review,
        }
    }
}

/// Label of the selector's start button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallToAction {
    Start,
    Continue,
    Review,
}

impl CallToAction {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Start => "Start Tour",
            Self::Continue => "Continue Tour",
            Self::Review => "Review Tour",
        }
    }
}

#[derive(Debug, Clone)]
struct ActiveTour {
    tour: Arc<Tour>,
    index: usize,
}

/// Percentage of `count` steps seen when standing on `index`, rounded half up.
fn percent_through(index: usize, count: usize) -> u8 {
    if count == 0 {
        return 0;
    }
    let seen = (index + 1).min(count);
    ((seen * 200 + count) / (count * 2)) as u8
}

/// Tour navigation state, owned by the hosting view.
pub struct TourRuntime {
    catalog: Arc<TourCatalog>,
    active: Option<ActiveTour>,
    completed: BTreeSet<String>,
    /// Last known progress of tours that are not active, from a restored record.
    resume_hints: BTreeMap<String, u8>,
    sinks: Vec<Box<dyn ProgressSink>>,
}

impl fmt::Debug for TourRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TourRuntime")
            .field("tours", &self.catalog.len())
            .field("active", &self.active_tour().map(|t| t.id()))
            .field("step", &self.current_step_index())
            .field("completed", &self.completed)
            .field("sinks", &self.sinks.len())
            .finish()
    }
}

impl Default for TourRuntime {
    fn default() -> Self {
        Self::new(Arc::new(TourCatalog::builtin()))
    }
}

impl TourRuntime {
    #[must_use]
    pub fn new(catalog: Arc<TourCatalog>) -> Self {
        Self {
            catalog,
            active: None,
            completed: BTreeSet::new(),
            resume_hints: BTreeMap::new(),
            sinks: Vec::new(),
        }
    }

    /// Seed completion state from a persisted record.
    ///
    /// Ids that are not in the catalog are kept; a later catalog revision may
    /// bring them back.
    pub fn restore(&mut self, record: &CompletionRecord) {
        self.completed.extend(record.completed.iter().cloned());
        self.resume_hints = record
            .progress
            .iter()
            .filter(|(id, pct)| **pct > 0 && !record.completed.contains(*id))
            .map(|(id, pct)| (id.clone(), (*pct).min(99)))
            .collect();
        tracing::debug!(
            target: "wayfinder.runtime",
            completed = self.completed.len(),
            resumable = self.resume_hints.len(),
            "completion state restored"
        );
    }

    /// Register a sink notified on every state-changing transition.
    pub fn subscribe(&mut self, sink: Box<dyn ProgressSink>) {
        self.sinks.push(sink);
    }

    #[must_use]
    pub fn catalog(&self) -> &Arc<TourCatalog> {
        &self.catalog
    }

    // --- Transitions -------------------------------------------------------

    /// Activate a tour at its first step.
    ///
    /// Unknown ids are ignored and leave any active tour untouched.
    pub fn start(&mut self, tour_id: &str) -> Option<TourEvent> {
        let Some(tour) = self.catalog.get(tour_id).cloned() else {
            tracing::debug!(
                target: "wayfinder.runtime",
                tour_id = %tour_id,
                "start ignored: unknown tour"
            );
            return None;
        };
        let replaced = self
            .active
            .replace(ActiveTour { tour, index: 0 })
            .map(|prev| prev.tour.id().to_string());
        tracing::debug!(
            target: "wayfinder.runtime",
            tour_id = %tour_id,
            replaced = ?replaced,
            "tour started"
        );
        self.emit(TourEvent::Started {
            tour_id: tour_id.to_string(),
            replaced,
        })
    }

    /// Advance one step, completing the tour when already on the last step.
    pub fn next(&mut self) -> Option<TourEvent> {
        let active = self.active.as_mut()?;
        let from = active.index;
        if from < active.tour.last_index() {
            active.index += 1;
            let tour_id = active.tour.id().to_string();
            return self.emit(TourEvent::StepChanged {
                tour_id,
                from,
                to: from + 1,
                reason: StepChangeReason::Next,
            });
        }
        self.complete()
    }

    /// Go back one step. No-op on the first step.
    pub fn previous(&mut self) -> Option<TourEvent> {
        let active = self.active.as_mut()?;
        if active.index == 0 {
            return None;
        }
        let from = active.index;
        active.index -= 1;
        let tour_id = active.tour.id().to_string();
        self.emit(TourEvent::StepChanged {
            tour_id,
            from,
            to: from - 1,
            reason: StepChangeReason::Previous,
        })
    }

    /// Jump to `index` if a tour is active and the index is in range.
    pub fn go_to_step(&mut self, index: usize) -> Option<TourEvent> {
        let active = self.active.as_mut()?;
        if index >= active.tour.step_count() {
            tracing::debug!(
                target: "wayfinder.runtime",
                tour_id = %active.tour.id(),
                index,
                step_count = active.tour.step_count(),
                "jump ignored: step index out of range"
            );
            return None;
        }
        if index == active.index {
            return None;
        }
        let from = active.index;
        active.index = index;
        let tour_id = active.tour.id().to_string();
        self.emit(TourEvent::StepChanged {
            tour_id,
            from,
            to: index,
            reason: StepChangeReason::Jump,
        })
    }

    /// End the active tour without recording completion.
    pub fn stop(&mut self) -> Option<TourEvent> {
        self.end(EndReason::Stopped)
    }

    /// Dismiss the active tour without recording completion.
    pub fn skip(&mut self) -> Option<TourEvent> {
        self.end(EndReason::Skipped)
    }

    fn end(&mut self, reason: EndReason) -> Option<TourEvent> {
        let active = self.active.take()?;
        let tour_id = active.tour.id().to_string();
        tracing::debug!(
            target: "wayfinder.runtime",
            tour_id = %tour_id,
            step = active.index,
            reason = ?reason,
            "tour ended"
        );
        self.emit(TourEvent::Ended { tour_id, reason })
    }

    fn complete(&mut self) -> Option<TourEvent> {
        let active = self.active.take()?;
        let tour_id = active.tour.id().to_string();
        self.completed.insert(tour_id.clone());
        self.resume_hints.remove(&tour_id);
        tracing::info!(
            target: "wayfinder.runtime",
            tour_id = %tour_id,
            steps = active.tour.step_count(),
            "tour completed"
        );
        self.emit(TourEvent::Completed { tour_id })
    }

    fn emit(&mut self, event: TourEvent) -> Option<TourEvent> {
        match &event {
            TourEvent::Started { tour_id, .. } | TourEvent::StepChanged { tour_id, .. } => {
                let percent = self.progress(tour_id);
                self.resume_hints.insert(tour_id.clone(), percent.min(99));
                for sink in &mut self.sinks {
                    sink.on_progress(tour_id, percent);
                }
            }
            TourEvent::Completed { tour_id } => {
                for sink in &mut self.sinks {
                    sink.on_completed(tour_id);
                }
            }
            TourEvent::Ended { tour_id, reason } => {
                for sink in &mut self.sinks {
                    sink.on_ended(tour_id, *reason);
                }
            }
        }
        Some(event)
    }

    // --- Queries -----------------------------------------------------------

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn active_tour(&self) -> Option<&Arc<Tour>> {
        self.active.as_ref().map(|a| &a.tour)
    }

    /// Index of the current step, or `None` when idle.
    #[must_use]
    pub fn current_step_index(&self) -> Option<usize> {
        self.active.as_ref().map(|a| a.index)
    }

    #[must_use]
    pub fn current_step(&self) -> Option<&TourStep> {
        self.active.as_ref().and_then(|a| a.tour.step(a.index))
    }

    #[must_use]
    pub fn is_tour_completed(&self, tour_id: &str) -> bool {
        self.completed.contains(tour_id)
    }

    /// Completed tour ids, sorted.
    #[must_use]
    pub fn completed_tours(&self) -> &BTreeSet<String> {
        &self.completed
    }

    /// Percent of `tour_id` done: 100 once completed, the rounded share of
    /// steps reached while active, 0 otherwise.
    #[must_use]
    pub fn progress(&self, tour_id: &str) -> u8 {
        if self.completed.contains(tour_id) {
            return 100;
        }
        match &self.active {
            Some(active) if active.tour.id() == tour_id => {
                percent_through(active.index, active.tour.step_count())
            }
            _ => 0,
        }
    }

    /// Whether step `step_index` of `tour_id` counts as done. The current
    /// step itself does not.
    #[must_use]
    pub fn is_step_completed(&self, tour_id: &str, step_index: usize) -> bool {
        if self.completed.contains(tour_id) {
            return true;
        }
        match &self.active {
            Some(active) if active.tour.id() == tour_id => active.index > step_index,
            _ => false,
        }
    }

    /// Selector status, including progress remembered from earlier sessions.
    #[must_use]
    pub fn status(&self, tour_id: &str) -> TourStatus {
        if self.completed.contains(tour_id) {
            return TourStatus::Completed;
        }
        let live = self.progress(tour_id);
        let percent = if live > 0 {
            live
        } else {
            self.resume_hints.get(tour_id).copied().unwrap_or(0)
        };
        if percent > 0 {
            TourStatus::InProgress { percent }
        } else {
            TourStatus::NotStarted
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::catalog::{Placement, TourCategory};

    fn runtime() -> TourRuntime {
        TourRuntime::default()
    }

    fn two_step_catalog() -> Arc<TourCatalog> {
        let steps = vec![
            TourStep::new("a", "A", "first", "body", Placement::Center),
            TourStep::new("b", "B", "second", "#b", Placement::Bottom),
        ];
        let tour = Tour::new("pair", "Pair", "", TourCategory::Setup, steps).unwrap();
        Arc::new(TourCatalog::new([tour]).unwrap())
    }

    #[derive(Default)]
    struct Recorder {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl ProgressSink for Recorder {
        fn on_progress(&mut self, tour_id: &str, percent: u8) {
            self.calls.borrow_mut().push(format!("progress:{tour_id}:{percent}"));
        }

        fn on_completed(&mut self, tour_id: &str) {
            self.calls.borrow_mut().push(format!("completed:{tour_id}"));
        }

        fn on_ended(&mut self, tour_id: &str, reason: EndReason) {
            self.calls.borrow_mut().push(format!("ended:{tour_id}:{reason:?}"));
        }
    }

    #[test]
    fn start_resets_to_first_step() {
        let mut rt = runtime();
        let event = rt.start("initial-setup").expect("known tour");
        assert_eq!(
            event,
            TourEvent::Started {
                tour_id: "initial-setup".into(),
                replaced: None
            }
        );
        assert_eq!(rt.current_step_index(), Some(0));
        assert_eq!(rt.active_tour().map(|t| t.id()), Some("initial-setup"));
    }

    #[test]
    fn start_unknown_preserves_state() {
        let mut rt = runtime();
        assert!(rt.start("unknown-id").is_none());
        assert!(rt.active_tour().is_none());

        rt.start("mcp-dashboard");
        rt.next();
        assert!(rt.start("unknown-id").is_none());
        assert_eq!(rt.active_tour().map(|t| t.id()), Some("mcp-dashboard"));
        assert_eq!(rt.current_step_index(), Some(1));
    }

    #[test]
    fn start_replaces_active_tour_without_completing_it() {
        let mut rt = runtime();
        rt.start("mcp-dashboard");
        rt.next();
        let event = rt.start("ai-assistant").unwrap();
        assert_eq!(
            event,
            TourEvent::Started {
                tour_id: "ai-assistant".into(),
                replaced: Some("mcp-dashboard".into())
            }
        );
        assert_eq!(rt.current_step_index(), Some(0));
        assert!(!rt.is_tour_completed("mcp-dashboard"));
        assert_eq!(rt.progress("mcp-dashboard"), 0);
    }

    #[test]
    fn initial_setup_scenario() {
        let mut rt = runtime();
        rt.start("initial-setup");
        assert_eq!(rt.progress("initial-setup"), 20);
        for _ in 0..4 {
            rt.next();
        }
        assert_eq!(rt.progress("initial-setup"), 100);
        assert!(rt.is_tour_completed("initial-setup"));
        assert!(rt.active_tour().is_none());
    }

    #[test]
    fn one_short_of_step_count_stays_active() {
        let mut rt = runtime();
        rt.start("initial-setup");
        for _ in 0..3 {
            rt.next();
        }
        assert!(rt.is_active());
        assert!(!rt.is_tour_completed("initial-setup"));
        assert_eq!(rt.current_step_index(), Some(3));
        assert_eq!(rt.progress("initial-setup"), 80);
    }

    #[test]
    fn previous_at_first_step_is_noop() {
        let mut rt = runtime();
        rt.start("ai-assistant");
        assert!(rt.previous().is_none());
        assert_eq!(rt.current_step_index(), Some(0));
    }

    #[test]
    fn previous_rewinds() {
        let mut rt = runtime();
        rt.start("ai-assistant");
        rt.next();
        let event = rt.previous().unwrap();
        assert!(matches!(
            event,
            TourEvent::StepChanged {
                from: 1,
                to: 0,
                reason: StepChangeReason::Previous,
                ..
            }
        ));
    }

    #[test]
    fn navigation_while_idle_is_noop() {
        let mut rt = runtime();
        assert!(rt.next().is_none());
        assert!(rt.previous().is_none());
        assert!(rt.go_to_step(0).is_none());
        assert!(rt.stop().is_none());
        assert!(rt.skip().is_none());
        assert!(rt.completed_tours().is_empty());
    }

    #[test]
    fn go_to_step_bounds() {
        let mut rt = runtime();
        rt.start("tariff-automation");
        assert!(rt.go_to_step(4).is_none());
        assert_eq!(rt.current_step_index(), Some(0));
        assert!(rt.go_to_step(0).is_none());
        let event = rt.go_to_step(3).unwrap();
        assert!(matches!(
            event,
            TourEvent::StepChanged {
                from: 0,
                to: 3,
                reason: StepChangeReason::Jump,
                ..
            }
        ));
        assert_eq!(rt.progress("tariff-automation"), 100);
        assert!(!rt.is_tour_completed("tariff-automation"));
    }

    #[test]
    fn skip_does_not_record_completion() {
        let mut rt = runtime();
        rt.start("ai-assistant");
        rt.go_to_step(2);
        let event = rt.skip().unwrap();
        assert_eq!(
            event,
            TourEvent::Ended {
                tour_id: "ai-assistant".into(),
                reason: EndReason::Skipped
            }
        );
        assert!(event.is_terminal());
        assert!(!rt.is_tour_completed("ai-assistant"));
        assert!(!rt.is_active());
    }

    #[test]
    fn completed_progress_survives_other_tours() {
        let mut rt = TourRuntime::new(two_step_catalog());
        rt.start("pair");
        rt.next();
        rt.next();
        assert_eq!(rt.progress("pair"), 100);
        rt.start("pair");
        rt.stop();
        assert_eq!(rt.progress("pair"), 100);
        assert!(rt.is_step_completed("pair", 1));
    }

    #[test]
    fn step_completion_is_strictly_before_current() {
        let mut rt = runtime();
        rt.start("initial-setup");
        rt.go_to_step(2);
        assert!(rt.is_step_completed("initial-setup", 0));
        assert!(rt.is_step_completed("initial-setup", 1));
        assert!(!rt.is_step_completed("initial-setup", 2));
        assert!(!rt.is_step_completed("initial-setup", 3));
        assert!(!rt.is_step_completed("mcp-dashboard", 0));
    }

    #[test]
    fn percent_rounds_half_up() {
        assert_eq!(percent_through(0, 3), 33);
        assert_eq!(percent_through(1, 3), 67);
        assert_eq!(percent_through(0, 8), 13);
        assert_eq!(percent_through(0, 1), 100);
        assert_eq!(percent_through(7, 8), 100);
        assert_eq!(percent_through(0, 0), 0);
    }

    #[test]
    fn sinks_see_every_transition() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let mut rt = TourRuntime::new(two_step_catalog());
        rt.subscribe(Box::new(Recorder {
            calls: Rc::clone(&calls),
        }));

        rt.start("pair");
        rt.next();
        rt.next();
        rt.start("pair");
        rt.skip();
        rt.previous();

        assert_eq!(
            *calls.borrow(),
            vec![
                "progress:pair:50",
                "progress:pair:100",
                "completed:pair",
                "progress:pair:100",
                "ended:pair:Skipped",
            ]
        );
    }

    #[test]
    fn restore_seeds_completed_and_resume_status() {
        let mut record = CompletionRecord::default();
        record.mark_completed("initial-setup");
        record.set_progress("mcp-dashboard", 50);
        record.set_progress("ai-assistant", 0);

        let mut rt = runtime();
        rt.restore(&record);

        assert!(rt.is_tour_completed("initial-setup"));
        assert_eq!(rt.status("initial-setup"), TourStatus::Completed);
        assert_eq!(
            rt.status("mcp-dashboard"),
            TourStatus::InProgress { percent: 50 }
        );
        assert_eq!(rt.progress("mcp-dashboard"), 0);
        assert_eq!(rt.status("ai-assistant"), TourStatus::NotStarted);
    }

    #[test]
    fn status_call_to_action_labels() {
        let mut rt = runtime();
        assert_eq!(rt.status("ai-assistant").call_to_action().label(), "Start Tour");
        rt.start("ai-assistant");
        assert_eq!(
            rt.status("ai-assistant").call_to_action(),
            CallToAction::Continue
        );
        rt.stop();
        assert_eq!(
            rt.status("ai-assistant"),
            TourStatus::InProgress { percent: 33 }
        );
        rt.start("ai-assistant");
        rt.go_to_step(2);
        rt.next();
        assert_eq!(rt.status("ai-assistant").call_to_action().label(), "Review Tour");
        assert_eq!(rt.status("ai-assistant").percent(), 100);
    }
}
