//! Per-subscriber handle: demand, cancellation and at-most-once delivery.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Weak};

use arc_swap::ArcSwapOption;
use tracing::{trace, warn};

use super::core::Shared;
use crate::protocol::Subscriber;
use crate::types::{HandleId, Outcome};

const NO_REQUEST_NO_VALUE: u8 = 0;
const HAS_REQUEST_NO_VALUE: u8 = 1;
/// A value arrived before any demand and is parked until `request`.
const NO_REQUEST_HAS_VALUE: u8 = 2;
/// Demand and value met; the value has been (or is being) emitted.
const HAS_REQUEST_HAS_VALUE: u8 = 3;
const CANCELLED: u8 = 4;

/// Internal subscription state, owned by the sink's registry while live.
pub(crate) struct SinkInner<T, E> {
    id: HandleId,
    downstream: Box<dyn Subscriber<T, E>>,
    /// Only used to request removal; never upgraded to keep the sink alive.
    owner: Weak<Shared<T, E>>,
    state: AtomicU8,
    /// Outcome waiting for demand, set only in `NO_REQUEST_HAS_VALUE`.
    parked: ArcSwapOption<Outcome<T, E>>,
    /// Self-reference held while a value is parked, so the handle outlives
    /// the termination snapshot until the consumer requests or cancels.
    keep_alive: ArcSwapOption<SinkInner<T, E>>,
}

impl<T, E> SinkInner<T, E> {
    pub(crate) fn new(
        id: HandleId,
        downstream: Box<dyn Subscriber<T, E>>,
        owner: Weak<Shared<T, E>>,
    ) -> Self {
        Self {
            id,
            downstream,
            owner,
            state: AtomicU8::new(NO_REQUEST_NO_VALUE),
            parked: ArcSwapOption::empty(),
            keep_alive: ArcSwapOption::empty(),
        }
    }

    pub(crate) fn id(&self) -> HandleId {
        self.id
    }

    pub(crate) fn downstream(&self) -> &dyn Subscriber<T, E> {
        self.downstream.as_ref()
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    pub(crate) fn has_requested(&self) -> bool {
        matches!(
            self.state.load(Ordering::Acquire),
            HAS_REQUEST_NO_VALUE | HAS_REQUEST_HAS_VALUE
        )
    }

    fn unpark(&self) {
        self.parked.store(None);
        self.keep_alive.store(None);
    }

    /// Cancel the subscription. Only the call that performs the transition
    /// drops a parked value and asks the owner to drop the handle.
    pub(crate) fn cancel(self: &Arc<Self>) {
        if self.state.swap(CANCELLED, Ordering::AcqRel) == CANCELLED {
            return;
        }
        trace!(handle = %self.id, "subscription cancelled");
        self.unpark();
        if let Some(owner) = self.owner.upgrade() {
            owner.remove(self);
        }
    }
}

impl<T: Clone, E> SinkInner<T, E> {
    /// Record demand, emitting a parked value if there is one.
    pub(crate) fn request(&self, n: u64) {
        if n == 0 {
            warn!(handle = %self.id, "request(0) violates the subscription protocol; ignored");
            return;
        }
        loop {
            match self.state.load(Ordering::Acquire) {
                NO_REQUEST_NO_VALUE => {
                    if self
                        .state
                        .compare_exchange(
                            NO_REQUEST_NO_VALUE,
                            HAS_REQUEST_NO_VALUE,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        return;
                    }
                }
                NO_REQUEST_HAS_VALUE => {
                    if self
                        .state
                        .compare_exchange(
                            NO_REQUEST_HAS_VALUE,
                            HAS_REQUEST_HAS_VALUE,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        // keep the self-reference until emission is over
                        let _keep_alive = self.keep_alive.swap(None);
                        if let Some(outcome) = self.parked.swap(None) {
                            trace!(handle = %self.id, "demand received, emitting parked value");
                            self.emit(&outcome);
                        }
                        return;
                    }
                }
                _ => return,
            }
        }
    }

    fn emit(&self, outcome: &Outcome<T, E>) {
        if let Outcome::Value(value) = outcome {
            self.downstream.on_next(value.clone());
            // on_next may have cancelled
            if !self.is_cancelled() {
                self.downstream.on_complete();
            }
        }
    }
}

impl<T: Clone, E: Clone> SinkInner<T, E> {
    /// Deliver the terminal outcome unless cancelled. Called at most once per
    /// handle, either from the termination snapshot or as a replay.
    ///
    /// A value waits for demand; completion and error never do.
    pub(crate) fn deliver(self: &Arc<Self>, outcome: &Arc<Outcome<T, E>>) {
        if self.is_cancelled() {
            trace!(handle = %self.id, "delivery suppressed, subscription cancelled");
            return;
        }
        match &**outcome {
            Outcome::Value(_) => self.deliver_value(outcome),
            Outcome::Empty => self.downstream.on_complete(),
            Outcome::Error(error) => self.downstream.on_error(error.clone()),
        }
    }

    fn deliver_value(self: &Arc<Self>, outcome: &Arc<Outcome<T, E>>) {
        loop {
            match self.state.load(Ordering::Acquire) {
                HAS_REQUEST_NO_VALUE => {
                    if self
                        .state
                        .compare_exchange(
                            HAS_REQUEST_NO_VALUE,
                            HAS_REQUEST_HAS_VALUE,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        self.emit(outcome);
                        return;
                    }
                }
                NO_REQUEST_NO_VALUE => {
                    // publish the value before the state that advertises it
                    self.parked.store(Some(Arc::clone(outcome)));
                    self.keep_alive.store(Some(Arc::clone(self)));
                    if self
                        .state
                        .compare_exchange(
                            NO_REQUEST_NO_VALUE,
                            NO_REQUEST_HAS_VALUE,
                            Ordering::AcqRel,
                            Ordering::Acquire,
                        )
                        .is_ok()
                    {
                        trace!(handle = %self.id, "value parked until demand");
                        return;
                    }
                    // lost to a request or a cancel
                    self.unpark();
                }
                _ => return,
            }
        }
    }
}

/// Consumer-facing view of a subscription handle.
///
/// Holds no ownership: once the handle has been removed (after
/// cancellation) or has delivered and been released by the sink, every
/// operation becomes a no-op.
pub struct Subscription<T, E> {
    id: HandleId,
    inner: Weak<SinkInner<T, E>>,
}

impl<T, E> Subscription<T, E> {
    pub(crate) fn new(inner: &Arc<SinkInner<T, E>>) -> Self {
        Self {
            id: inner.id(),
            inner: Arc::downgrade(inner),
        }
    }

    pub fn id(&self) -> HandleId {
        self.id
    }

    /// Stop any further delivery to this subscriber. Idempotent.
    pub fn cancel(&self) {
        if let Some(inner) = self.inner.upgrade() {
            inner.cancel();
        }
    }

    /// True while the handle exists and has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.is_cancelled())
    }

    /// True while the handle exists and has seen positive demand.
    pub fn has_requested(&self) -> bool {
        self.inner.upgrade().is_some_and(|inner| inner.has_requested())
    }

    /// True once nothing holds the handle any more.
    pub fn is_released(&self) -> bool {
        self.inner.strong_count() == 0
    }
}

impl<T: Clone, E> Subscription<T, E> {
    /// Signal demand for `n` items. Any positive `n` covers the single value
    /// a sink can emit; a value that arrived earlier is emitted right away.
    ///
    /// `n == 0` is logged and ignored rather than turned into `on_error`:
    /// the error type belongs to the producer, so the sink has no `E` to
    /// report the violation with.
    pub fn request(&self, n: u64) {
        if let Some(inner) = self.inner.upgrade() {
            inner.request(n);
        }
    }
}

impl<T, E> Clone for Subscription<T, E> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            inner: Weak::clone(&self.inner),
        }
    }
}

impl<T, E> fmt::Debug for Subscription<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("released", &self.is_released())
            .finish()
    }
}
