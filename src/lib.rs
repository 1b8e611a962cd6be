//! # monosink
//!
//! A manually driven sink that emits at most one terminal signal (a value,
//! an empty completion, or an error) to any number of subscribers, and
//! replays that signal to subscribers that arrive later.
//!
//! ## Core Concepts
//!
//! - **Sink**: [`SinkOne`], driven by `succeed` / `complete` / `fail`; the
//!   first call wins, the rest are ignored
//! - **Subscriber**: implements [`Subscriber`]; acknowledged with
//!   `on_subscribe` before any other signal
//! - **Subscription**: the consumer's non-owning handle to `request` and
//!   `cancel`
//! - **Replay**: late subscribers get the cached [`Outcome`] synchronously
//!
//! Registration, cancellation and termination may race on any threads. The
//! registry is a copy-on-write snapshot swapped with compare-and-swap, so no
//! lock is taken on any path.
//!
//! ## Example
//!
//! ```
//! use monosink::{Outcome, SinkOne};
//! use std::sync::{Arc, Mutex};
//!
//! let sink: SinkOne<bool, String> = SinkOne::new();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//!
//! let early = Arc::clone(&seen);
//! sink.subscribe_fn(move |v| early.lock().unwrap().push(v));
//!
//! assert!(sink.succeed(Some(true)));
//! assert!(!sink.fail("too late".to_string()));
//!
//! let late = Arc::clone(&seen);
//! sink.subscribe_fn(move |v| late.lock().unwrap().push(v));
//!
//! assert_eq!(*seen.lock().unwrap(), vec![true, true]);
//! assert_eq!(sink.outcome(), Some(Outcome::Value(true)));
//! ```

pub mod error;
pub mod protocol;
pub mod sink;
pub mod subscriptions;
pub mod types;

// Re-exports
pub use error::{Result, SinkError};
pub use protocol::Subscriber;
pub use sink::{SinkConfig, SinkOne, SinkSeed, Subscription};
pub use subscriptions::{ChannelConfig, ChannelSubscriber, FnSubscriber, Gate, SignalReceiver};
pub use types::*;
