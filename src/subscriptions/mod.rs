//! Ready-made subscribers.
//!
//! - [`ChannelSubscriber`] / [`SignalReceiver`]: every signal lands in a
//!   channel, received blocking, non-blocking or with a timeout
//! - [`FnSubscriber`]: a value callback
//! - [`Gate`]: a flag that closes when the sink terminates
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use monosink::{ChannelConfig, Signal, SinkOne};
//!
//! let sink: SinkOne<&str, String> = SinkOne::new();
//! let receiver = sink.subscribe_channel(ChannelConfig::default());
//! let gate = sink.gate();
//!
//! sink.fail("upstream gone".to_string());
//!
//! loop {
//!     match receiver.recv_timeout(Duration::from_secs(1)) {
//!         Ok(Signal::Subscribed) => continue,
//!         Ok(Signal::Error(e)) => {
//!             assert_eq!(e, "upstream gone");
//!             break;
//!         }
//!         Ok(other) => panic!("unexpected {other:?}"),
//!         Err(e) => panic!("{e}"),
//!     }
//! }
//! assert!(gate.is_closed());
//! ```

mod callback;
mod channel;
mod gate;

pub use callback::FnSubscriber;
pub use channel::{ChannelConfig, ChannelSubscriber, SignalReceiver};
pub use gate::Gate;
