//! Consumer side of the streaming protocol.

use crate::sink::Subscription;

/// A consumer of sink signals.
///
/// For each subscription the sink calls `on_subscribe` exactly once, before
/// anything else, then at most one `on_next`, then exactly one of
/// `on_complete` or `on_error`, unless the subscription was cancelled in the
/// meantime. Calls may arrive on any thread, hence `&self` and `Send + Sync`.
pub trait Subscriber<T, E>: Send + Sync {
    /// Registration acknowledgment. Keep `subscription` to request or cancel.
    fn on_subscribe(&self, subscription: Subscription<T, E>);

    fn on_next(&self, value: T);

    fn on_error(&self, error: E);

    fn on_complete(&self);
}
