//! Use a sink's termination as a stop trigger for something else.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::trace;

use crate::protocol::Subscriber;
use crate::sink::{SinkOne, Subscription};

/// Open until the sink it is subscribed to emits any signal past the
/// acknowledgment, then closed for good.
///
/// A periodic source checks [`is_open`](Self::is_open) before each emission.
#[derive(Clone, Debug, Default)]
pub struct Gate {
    closed: Arc<AtomicBool>,
}

impl Gate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        !self.is_closed()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn close(&self) {
        if !self.closed.swap(true, Ordering::AcqRel) {
            trace!("gate closed");
        }
    }
}

impl<T: Clone, E> Subscriber<T, E> for Gate {
    fn on_subscribe(&self, subscription: Subscription<T, E>) {
        subscription.request(1);
    }

    fn on_next(&self, _value: T) {
        self.close();
    }

    fn on_error(&self, _error: E) {
        self.close();
    }

    fn on_complete(&self) {
        self.close();
    }
}

impl<T, E> SinkOne<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// A gate that closes when this sink terminates, however it terminates.
    pub fn gate(&self) -> Gate {
        let gate = Gate::new();
        self.subscribe(gate.clone());
        gate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_closes_on_termination() {
        let sink: SinkOne<bool, String> = SinkOne::new();
        let gate = sink.gate();
        assert!(gate.is_open());

        sink.succeed(Some(true));

        assert!(gate.is_closed());
    }

    #[test]
    fn test_gate_on_terminated_sink_is_closed_immediately() {
        let sink: SinkOne<bool, String> = SinkOne::new();
        sink.fail("stop".into());

        assert!(sink.gate().is_closed());
    }

    #[test]
    fn test_gate_clones_share_state() {
        let sink: SinkOne<bool, String> = SinkOne::new();
        let gate = sink.gate();
        let observer = gate.clone();

        sink.complete();

        assert!(observer.is_closed());
    }
}
