//! The sink: lock-free subscriber registry and one-shot termination.

use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::{debug, trace};

use super::handle::{SinkInner, Subscription};
use crate::error::SinkError;
use crate::protocol::Subscriber;
use crate::types::{HandleId, Outcome, SinkStats, Termination};

/// Sink configuration.
#[derive(Clone, Debug)]
pub struct SinkConfig {
    /// Name used in log fields and stats.
    pub label: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            label: "sink".to_string(),
        }
    }
}

/// Registry contents: the live handles, or the frozen marker carrying the
/// cached outcome once the sink has terminated.
pub(crate) enum Registry<T, E> {
    Open(Vec<Arc<SinkInner<T, E>>>),
    Frozen(Arc<Outcome<T, E>>),
}

/// State shared by every clone of a sink. Handles point back here weakly.
pub(crate) struct Shared<T, E> {
    label: String,
    /// Copy-on-write snapshot, replaced wholesale on every mutation.
    registry: ArcSwap<Registry<T, E>>,
    /// Gate for the single `Pending` transition. It flips before the
    /// registry freezes, so observers read the registry instead.
    termination: AtomicU8,
    next_id: AtomicU64,
}

impl<T, E> Shared<T, E> {
    fn new(config: SinkConfig) -> Self {
        Self {
            label: config.label,
            registry: ArcSwap::from_pointee(Registry::Open(Vec::new())),
            termination: AtomicU8::new(Termination::Pending as u8),
            next_id: AtomicU64::new(1),
        }
    }

    /// Append `handle` to the live registry.
    ///
    /// Fails with the cached outcome when the registry is already frozen.
    pub(crate) fn add(&self, handle: &Arc<SinkInner<T, E>>) -> Result<(), Arc<Outcome<T, E>>> {
        loop {
            let current = self.registry.load_full();
            let live = match &*current {
                Registry::Frozen(outcome) => return Err(Arc::clone(outcome)),
                Registry::Open(live) => live,
            };

            let mut next = Vec::with_capacity(live.len() + 1);
            next.extend(live.iter().cloned());
            next.push(Arc::clone(handle));

            let previous = self
                .registry
                .compare_and_swap(&current, Arc::new(Registry::Open(next)));
            if Arc::ptr_eq(&*previous, &current) {
                trace!(sink = %self.label, handle = %handle.id(), "subscriber registered");
                return Ok(());
            }
        }
    }

    /// Remove `handle` by identity. No-op if absent or frozen.
    pub(crate) fn remove(&self, handle: &Arc<SinkInner<T, E>>) {
        loop {
            let current = self.registry.load_full();
            let live = match &*current {
                Registry::Frozen(_) => return,
                Registry::Open(live) => live,
            };
            let Some(index) = live.iter().position(|h| Arc::ptr_eq(h, handle)) else {
                return;
            };

            let next: Vec<_> = live
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, h)| Arc::clone(h))
                .collect();

            let previous = self
                .registry
                .compare_and_swap(&current, Arc::new(Registry::Open(next)));
            if Arc::ptr_eq(&*previous, &current) {
                trace!(sink = %self.label, handle = %handle.id(), "subscriber removed");
                return;
            }
        }
    }

    /// Pending until the registry is frozen, so a terminated sink always
    /// has an outcome to report.
    fn termination(&self) -> Termination {
        match &**self.registry.load() {
            Registry::Frozen(outcome) => outcome.termination(),
            Registry::Open(_) => Termination::Pending,
        }
    }

    fn outcome(&self) -> Option<Arc<Outcome<T, E>>> {
        match &**self.registry.load() {
            Registry::Frozen(outcome) => Some(Arc::clone(outcome)),
            Registry::Open(_) => None,
        }
    }

    fn live_count(&self) -> usize {
        match &**self.registry.load() {
            Registry::Open(live) => live.len(),
            Registry::Frozen(_) => 0,
        }
    }
}

impl<T: Clone, E: Clone> Shared<T, E> {
    /// Win the `Pending` transition, freeze the registry and deliver to the
    /// captured snapshot. Returns false if another termination already won.
    fn terminate(&self, outcome: Outcome<T, E>) -> bool {
        let to = outcome.termination();
        if let Err(current) = self.termination.compare_exchange(
            Termination::Pending as u8,
            to as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            trace!(
                sink = %self.label,
                attempted = ?to,
                current = ?Termination::from_u8(current),
                "sink already terminated; ignoring"
            );
            return false;
        }

        let outcome = Arc::new(outcome);
        let previous = self
            .registry
            .swap(Arc::new(Registry::Frozen(Arc::clone(&outcome))));

        // Only the winner of the flag ever freezes, so `previous` is open.
        if let Registry::Open(snapshot) = &*previous {
            debug!(sink = %self.label, termination = ?to, subscribers = snapshot.len(), "sink terminated");
            for handle in snapshot {
                handle.deliver(&outcome);
            }
        }
        true
    }
}

/// A manually driven one-shot sink.
///
/// A producer calls [`succeed`](Self::succeed), [`complete`](Self::complete)
/// or [`fail`](Self::fail); the first call wins and later ones are ignored.
/// Every subscriber registered at that moment receives the terminal signal,
/// and subscribers arriving later get it replayed on subscription.
///
/// Clones share the same sink.
pub struct SinkOne<T, E = SinkError> {
    shared: Arc<Shared<T, E>>,
}

impl<T, E> SinkOne<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Create a pending sink with the default configuration.
    pub fn new() -> Self {
        Self::with_config(SinkConfig::default())
    }

    pub fn with_config(config: SinkConfig) -> Self {
        Self {
            shared: Arc::new(Shared::new(config)),
        }
    }

    /// Subscribe a consumer.
    ///
    /// The consumer's `on_subscribe` runs before anything else. If the sink
    /// has already terminated, the cached signal is replayed synchronously
    /// before this returns.
    pub fn subscribe<S>(&self, subscriber: S) -> Subscription<T, E>
    where
        S: Subscriber<T, E> + 'static,
    {
        let id = HandleId(self.shared.next_id.fetch_add(1, Ordering::Relaxed));
        let handle = Arc::new(SinkInner::new(
            id,
            Box::new(subscriber),
            Arc::downgrade(&self.shared),
        ));
        let subscription = Subscription::new(&handle);

        handle.downstream().on_subscribe(subscription.clone());

        match self.shared.add(&handle) {
            Ok(()) => {
                // cancelled inside on_subscribe, before it was registered
                if handle.is_cancelled() {
                    self.shared.remove(&handle);
                }
            }
            Err(outcome) => {
                trace!(sink = %self.shared.label, handle = %id, "replaying cached outcome");
                handle.deliver(&outcome);
            }
        }
        subscription
    }

    /// Complete with `value`, or empty when `None`.
    ///
    /// Returns true if this call terminated the sink.
    pub fn succeed(&self, value: Option<T>) -> bool {
        self.shared.terminate(Outcome::from_success(value))
    }

    /// Complete without a value.
    pub fn complete(&self) -> bool {
        self.succeed(None)
    }

    /// Terminate with `error`, forwarded as-is to every subscriber.
    ///
    /// Returns true if this call terminated the sink.
    pub fn fail(&self, error: E) -> bool {
        self.shared.terminate(Outcome::Error(error))
    }
}

impl<T, E> SinkOne<T, E> {
    pub fn label(&self) -> &str {
        &self.shared.label
    }

    pub fn termination(&self) -> Termination {
        self.shared.termination()
    }

    pub fn is_terminated(&self) -> bool {
        self.termination().is_terminated()
    }

    /// Number of live subscribers. Always zero once terminated.
    pub fn subscriber_count(&self) -> usize {
        self.shared.live_count()
    }

    /// The cached outcome, once the registry has been frozen.
    pub fn outcome(&self) -> Option<Outcome<T, E>>
    where
        T: Clone,
        E: Clone,
    {
        self.shared.outcome().map(|outcome| (*outcome).clone())
    }

    pub fn stats(&self) -> SinkStats {
        SinkStats {
            label: self.shared.label.clone(),
            termination: self.termination(),
            subscribers: self.subscriber_count(),
        }
    }

    /// Whether both values refer to the same sink.
    pub fn same_sink(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<T, E> Clone for SinkOne<T, E> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, E> Default for SinkOne<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T, E> fmt::Debug for SinkOne<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SinkOne")
            .field("label", &self.shared.label)
            .field("termination", &self.termination())
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}
