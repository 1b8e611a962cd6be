//! Closure-backed subscriber for "just give me the value" consumers.

use tracing::debug;

use crate::protocol::Subscriber;
use crate::sink::{SinkOne, Subscription};

/// Calls `on_value` with the emitted value. Completion is ignored and errors
/// are only logged.
pub struct FnSubscriber<F> {
    on_value: F,
}

impl<F> FnSubscriber<F> {
    pub fn new(on_value: F) -> Self {
        Self { on_value }
    }
}

impl<T, E, F> Subscriber<T, E> for FnSubscriber<F>
where
    T: Clone,
    F: Fn(T) + Send + Sync,
{
    fn on_subscribe(&self, subscription: Subscription<T, E>) {
        subscription.request(u64::MAX);
    }

    fn on_next(&self, value: T) {
        (self.on_value)(value);
    }

    fn on_error(&self, _error: E) {
        debug!("error signal reached a value-only subscriber");
    }

    fn on_complete(&self) {}
}

impl<T, E> SinkOne<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Subscribe with a value callback.
    pub fn subscribe_fn<F>(&self, on_value: F) -> Subscription<T, E>
    where
        F: Fn(T) + Send + Sync + 'static,
    {
        self.subscribe(FnSubscriber::new(on_value))
    }
}
