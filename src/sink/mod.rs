//! The one-shot sink and its subscription handles.
//!
//! A [`SinkOne`] keeps its live subscription handles in a copy-on-write
//! snapshot that is swapped atomically on every registration or removal.
//! Termination flips a one-shot flag, swaps the snapshot for a frozen marker
//! carrying the outcome, and delivers to every handle in the swapped-out
//! snapshot. Registrations that find the marker get the outcome replayed.
//!
//! # Example
//!
//! ```
//! use monosink::{ChannelConfig, Signal, SinkOne};
//!
//! let sink: SinkOne<u32, String> = SinkOne::new();
//! let early = sink.subscribe_channel(ChannelConfig::default());
//!
//! sink.succeed(Some(42));
//! let late = sink.subscribe_channel(ChannelConfig::default());
//!
//! for receiver in [early, late] {
//!     assert_eq!(
//!         receiver.drain(),
//!         vec![Signal::Subscribed, Signal::Next(42), Signal::Complete]
//!     );
//! }
//! ```

mod core;
mod handle;
mod seed;

pub use self::core::{SinkConfig, SinkOne};
pub use handle::Subscription;
pub use seed::SinkSeed;
