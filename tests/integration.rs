//! End-to-end scenarios for the one-shot sink.

use monosink::{
    ChannelConfig, Outcome, Signal, SinkOne, Subscriber, Subscription, Termination,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;

/// Records values only, like a plain "on next" consumer.
#[derive(Clone, Default)]
struct ValueCollector<T> {
    values: Arc<Mutex<Vec<T>>>,
    completions: Arc<Mutex<usize>>,
}

impl<T: Clone> ValueCollector<T> {
    fn values(&self) -> Vec<T> {
        self.values.lock().clone()
    }

    fn completions(&self) -> usize {
        *self.completions.lock()
    }
}

impl<T: Clone + Send, E> Subscriber<T, E> for ValueCollector<T> {
    fn on_subscribe(&self, subscription: Subscription<T, E>) {
        subscription.request(1);
    }

    fn on_next(&self, value: T) {
        self.values.lock().push(value);
    }

    fn on_error(&self, _error: E) {}

    fn on_complete(&self) {
        *self.completions.lock() += 1;
    }
}

// --- Replay ---

#[test]
fn test_subscribe_before_emit() {
    let sink: SinkOne<String, String> = SinkOne::new();
    let list = Arc::new(Mutex::new(Vec::new()));

    let first = ValueCollector::<String>::default();
    sink.subscribe(first.clone());
    let target = Arc::clone(&list);
    sink.subscribe_fn(move |v| target.lock().push(v));

    sink.succeed(Some("foo".to_string()));

    assert_eq!(first.values(), vec!["foo"]);
    assert_eq!(*list.lock(), vec!["foo"]);
}

#[test]
fn test_subscribe_after_emit() {
    let sink: SinkOne<String, String> = SinkOne::new();
    sink.succeed(Some("foo".to_string()));

    let first = ValueCollector::<String>::default();
    sink.subscribe(first.clone());
    let second = ValueCollector::<String>::default();
    sink.subscribe(second.clone());

    assert_eq!(first.values(), vec!["foo"]);
    assert_eq!(second.values(), vec!["foo"]);
}

#[test]
fn test_boolean_collector_scenario() {
    let sink: SinkOne<bool, String> = SinkOne::new();

    let early = ValueCollector::<bool>::default();
    sink.subscribe(early.clone());
    assert!(early.values().is_empty());

    sink.succeed(Some(true));
    assert_eq!(early.values(), vec![true]);
    assert_eq!(early.completions(), 1);

    let late = ValueCollector::<bool>::default();
    sink.subscribe(late.clone());
    assert_eq!(late.values(), vec![true]);
    assert_eq!(late.completions(), 1);

    // nothing more arrives for the early collector
    assert_eq!(early.values(), vec![true]);
    assert_eq!(early.completions(), 1);
}

#[test]
fn test_channel_signal_order() {
    let sink: SinkOne<u64, String> = SinkOne::new();
    let receiver = sink.subscribe_channel(ChannelConfig::default());

    sink.succeed(Some(7));

    let timeout = Duration::from_millis(100);
    assert_eq!(receiver.recv_timeout(timeout).unwrap(), Signal::Subscribed);
    assert_eq!(receiver.recv_timeout(timeout).unwrap(), Signal::Next(7));
    assert_eq!(receiver.recv_timeout(timeout).unwrap(), Signal::Complete);
}

#[test]
fn test_empty_completion_to_every_subscriber() {
    let sink: SinkOne<u64, String> = SinkOne::new();
    let early = sink.subscribe_channel(ChannelConfig::default());

    sink.complete();
    let late = sink.subscribe_channel(ChannelConfig::default());

    for receiver in [early, late] {
        assert_eq!(receiver.drain(), vec![Signal::Subscribed, Signal::Complete]);
    }
    assert_eq!(sink.outcome(), Some(Outcome::Empty));
}

// --- Cancellation ---

#[test]
fn test_cancelled_subscriber_receives_nothing() {
    let sink: SinkOne<u64, String> = SinkOne::new();
    let kept = sink.subscribe_channel(ChannelConfig::default());
    let cancelled = sink.subscribe_channel(ChannelConfig::default());
    assert_eq!(sink.subscriber_count(), 2);

    cancelled.cancel();
    assert_eq!(sink.subscriber_count(), 1);
    assert!(cancelled.subscription().unwrap().is_released());

    sink.succeed(Some(1));

    assert_eq!(cancelled.drain(), vec![Signal::Subscribed]);
    assert_eq!(
        kept.drain(),
        vec![Signal::Subscribed, Signal::Next(1), Signal::Complete]
    );
}

// --- Gating ---

#[test]
fn test_sink_completion_gates_periodic_source() {
    let sink: SinkOne<bool, String> = SinkOne::new();
    let gate = sink.gate();
    let mut emitted = Vec::new();

    // A periodic source ticking until the gate closes; the sink fires after
    // the third tick.
    for tick in 0u64..10 {
        if gate.is_closed() {
            break;
        }
        emitted.push(tick);
        if tick == 2 {
            sink.succeed(Some(true));
        }
    }

    assert_eq!(emitted, vec![0, 1, 2]);
    assert_eq!(sink.termination(), Termination::Succeeded);
}

#[test]
fn test_sink_completion_gates_threaded_ticker() {
    let sink: SinkOne<bool, String> = SinkOne::new();
    let gate = sink.gate();
    let (tick_tx, tick_rx) = crossbeam_channel::bounded::<u64>(0);
    let (ack_tx, ack_rx) = crossbeam_channel::bounded::<()>(0);

    let ticker = std::thread::spawn(move || {
        let mut emitted = Vec::new();
        let mut tick = 0;
        while gate.is_open() {
            emitted.push(tick);
            if tick_tx.send(tick).is_err() {
                break;
            }
            // wait until the driver has looked at this tick
            if ack_rx.recv().is_err() {
                break;
            }
            tick += 1;
        }
        emitted
    });

    for tick in tick_rx.iter() {
        if tick == 2 {
            sink.succeed(Some(true));
        }
        if ack_tx.send(()).is_err() {
            break;
        }
    }

    assert_eq!(ticker.join().unwrap(), vec![0, 1, 2]);
}
