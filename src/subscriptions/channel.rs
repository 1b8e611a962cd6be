//! Subscriber that forwards every signal into a crossbeam channel.

use std::fmt;
use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{trace, warn};

use crate::error::{Result, SinkError};
use crate::protocol::Subscriber;
use crate::sink::{SinkOne, Subscription};
use crate::types::Signal;

/// Upper bound of signals one subscription can produce:
/// acknowledgment, value, completion.
const MAX_SIGNALS: usize = 3;

/// Configuration for a channel subscriber.
#[derive(Clone, Debug)]
pub struct ChannelConfig {
    /// Demand requested on acknowledgment (0 = request nothing).
    /// Default: unbounded
    pub initial_request: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            initial_request: u64::MAX,
        }
    }
}

/// Forwards signals to a [`SignalReceiver`].
pub struct ChannelSubscriber<T, E> {
    config: ChannelConfig,
    sender: Sender<Signal<T, E>>,
}

impl<T, E> ChannelSubscriber<T, E> {
    /// Create a subscriber and the receiving end of its channel.
    pub fn new(config: ChannelConfig) -> (Self, SignalReceiver<T, E>) {
        let (sender, receiver) = bounded(MAX_SIGNALS);
        let receiver = SignalReceiver {
            receiver,
            subscription: None,
        };
        (Self { config, sender }, receiver)
    }

    fn forward(&self, signal: Signal<T, E>) {
        match self.sender.try_send(signal) {
            Ok(()) => {}
            Err(crossbeam_channel::TrySendError::Full(_)) => {
                warn!("signal channel full; more than one terminal signal was emitted");
            }
            Err(crossbeam_channel::TrySendError::Disconnected(_)) => {
                trace!("signal receiver dropped; discarding signal");
            }
        }
    }
}

impl<T, E> Subscriber<T, E> for ChannelSubscriber<T, E>
where
    T: Clone + Send,
    E: Send,
{
    fn on_subscribe(&self, subscription: Subscription<T, E>) {
        self.forward(Signal::Subscribed);
        if self.config.initial_request > 0 {
            subscription.request(self.config.initial_request);
        }
    }

    fn on_next(&self, value: T) {
        self.forward(Signal::Next(value));
    }

    fn on_error(&self, error: E) {
        self.forward(Signal::Error(error));
    }

    fn on_complete(&self) {
        self.forward(Signal::Complete);
    }
}

/// Receiving end of a [`ChannelSubscriber`].
pub struct SignalReceiver<T, E> {
    receiver: Receiver<Signal<T, E>>,
    subscription: Option<Subscription<T, E>>,
}

impl<T, E> SignalReceiver<T, E> {
    /// Attach the subscription so [`cancel`](Self::cancel) can reach it.
    pub fn with_subscription(mut self, subscription: Subscription<T, E>) -> Self {
        self.subscription = Some(subscription);
        self
    }

    pub fn subscription(&self) -> Option<&Subscription<T, E>> {
        self.subscription.as_ref()
    }

    /// Receive the next signal (blocking).
    pub fn recv(&self) -> Result<Signal<T, E>> {
        Ok(self.receiver.recv()?)
    }

    /// Try to receive a signal (non-blocking).
    pub fn try_recv(&self) -> Result<Signal<T, E>> {
        Ok(self.receiver.try_recv()?)
    }

    /// Receive with timeout.
    pub fn recv_timeout(&self, timeout: Duration) -> Result<Signal<T, E>> {
        self.receiver.recv_timeout(timeout).map_err(|e| match e {
            crossbeam_channel::RecvTimeoutError::Timeout => SinkError::Timeout(timeout),
            crossbeam_channel::RecvTimeoutError::Disconnected => SinkError::Disconnected,
        })
    }

    /// Everything received so far, without blocking.
    pub fn drain(&self) -> Vec<Signal<T, E>> {
        self.receiver.try_iter().collect()
    }

    /// Cancel the attached subscription, if any.
    pub fn cancel(&self) {
        if let Some(subscription) = &self.subscription {
            subscription.cancel();
        }
    }
}

impl<T, E> fmt::Debug for SignalReceiver<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalReceiver")
            .field("pending", &self.receiver.len())
            .field("subscription", &self.subscription)
            .finish()
    }
}

impl<T, E> SinkOne<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Subscribe a channel-backed consumer and return its receiver.
    pub fn subscribe_channel(&self, config: ChannelConfig) -> SignalReceiver<T, E> {
        let (subscriber, receiver) = ChannelSubscriber::new(config);
        let subscription = self.subscribe(subscriber);
        receiver.with_subscription(subscription)
    }
}
