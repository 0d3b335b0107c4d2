#![forbid(unsafe_code)]

//! Progress notifications.
//!
//! A [`ProgressSink`] is registered on a [`TourRuntime`](crate::TourRuntime)
//! and called synchronously after every state-changing transition.
//! [`PersistentProgress`] is the sink that keeps completion durable across
//! sessions by writing through a [`CompletionStore`].

use crate::runtime::EndReason;
use crate::store::{CompletionRecord, CompletionStore, StoreResult};

/// Receiver of runtime transitions. All methods default to no-ops.
pub trait ProgressSink {
    /// A tour started or changed step; `percent` is its new progress.
    fn on_progress(&mut self, _tour_id: &str, _percent: u8) {}

    /// A tour reached its end.
    fn on_completed(&mut self, _tour_id: &str) {}

    /// A tour was stopped or skipped before completing.
    fn on_ended(&mut self, _tour_id: &str, _reason: EndReason) {}
}

/// Sink that mirrors progress into a [`CompletionRecord`] and saves it on
/// every change.
///
/// Save failures are logged and otherwise ignored: losing a progress update
/// must never break navigation.
#[derive(Debug)]
pub struct PersistentProgress<S> {
    store: S,
    record: CompletionRecord,
}

impl<S: CompletionStore> PersistentProgress<S> {
    /// Load the current record from `store`.
    pub fn open(store: S) -> StoreResult<Self> {
        let record = store.load()?;
        Ok(Self { store, record })
    }

    /// Start from an already-loaded record.
    pub fn with_record(store: S, record: CompletionRecord) -> Self {
        Self { store, record }
    }

    #[must_use]
    pub fn record(&self) -> &CompletionRecord {
        &self.record
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&self, tour_id: &str) {
        if let Err(err) = self.store.save(&self.record) {
            tracing::warn!(
                target: "wayfinder.runtime",
                tour_id = %tour_id,
                error = %err,
                "failed to persist tour progress"
            );
        }
    }
}

impl<S: CompletionStore> ProgressSink for PersistentProgress<S> {
    fn on_progress(&mut self, tour_id: &str, percent: u8) {
        if self.record.is_completed(tour_id) {
            return;
        }
        if self.record.set_progress(tour_id, percent) {
            self.persist(tour_id);
        }
    }

    fn on_completed(&mut self, tour_id: &str) {
        if self.record.mark_completed(tour_id) {
            self.persist(tour_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreError};
    use crate::{TourCatalog, TourRuntime};
    use std::sync::{Arc, Mutex};
    use tracing_subscriber::layer::SubscriberExt;

    struct FailingStore;

    impl CompletionStore for FailingStore {
        fn load(&self) -> StoreResult<CompletionRecord> {
            Ok(CompletionRecord::default())
        }

        fn save(&self, _record: &CompletionRecord) -> StoreResult<()> {
            Err(StoreError::Io(std::io::Error::other("disk full")))
        }
    }

    #[test]
    fn completion_is_written_through() {
        let store = MemoryStore::new();
        let mut rt = TourRuntime::new(Arc::new(TourCatalog::builtin()));
        rt.subscribe(Box::new(PersistentProgress::open(store.clone()).unwrap()));

        rt.start("ai-assistant");
        assert_eq!(store.snapshot().last_progress("ai-assistant"), 33);
        rt.next();
        rt.next();
        rt.next();

        let saved = store.snapshot();
        assert!(saved.is_completed("ai-assistant"));
        assert_eq!(saved.last_progress("ai-assistant"), 100);
        assert!(store.save_count() >= 4);
    }

    #[test]
    fn completed_tour_progress_is_not_rewritten() {
        let store = MemoryStore::new();
        let mut sink = PersistentProgress::open(store.clone()).unwrap();
        sink.on_completed("t");
        let saves = store.save_count();
        sink.on_progress("t", 20);
        assert_eq!(store.save_count(), saves);
        assert_eq!(sink.record().last_progress("t"), 100);
    }

    #[test]
    fn unchanged_progress_skips_save() {
        let store = MemoryStore::new();
        let mut sink = PersistentProgress::open(store.clone()).unwrap();
        sink.on_progress("t", 40);
        sink.on_progress("t", 40);
        assert_eq!(store.save_count(), 1);
    }

    #[test]
    fn save_failure_does_not_break_navigation() {
        let mut rt = TourRuntime::default();
        rt.subscribe(Box::new(PersistentProgress::with_record(
            FailingStore,
            CompletionRecord::default(),
        )));
        rt.start("ai-assistant");
        rt.go_to_step(2);
        assert!(rt.next().is_some());
        assert!(rt.is_tour_completed("ai-assistant"));
    }

    // Tracing capture infrastructure
    struct WarnCapture {
        messages: Arc<Mutex<Vec<(String, String)>>>,
    }

    struct MessageVisitor(String);

    impl tracing::field::Visit for MessageVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCapture {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() != tracing::Level::WARN {
                return;
            }
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.messages
                .lock()
                .unwrap()
                .push((event.metadata().target().to_string(), visitor.0));
        }
    }

    #[test]
    fn save_failure_is_logged_as_warning() {
        let messages = Arc::new(Mutex::new(Vec::new()));
        let subscriber = tracing_subscriber::registry().with(WarnCapture {
            messages: messages.clone(),
        });
        tracing::subscriber::with_default(subscriber, || {
            let mut sink = PersistentProgress::with_record(FailingStore, CompletionRecord::default());
            sink.on_progress("t", 50);
        });

        let messages = messages.lock().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].0, "wayfinder.runtime");
        assert_eq!(messages[0].1, "failed to persist tour progress");
    }
}
