//! Reuse-or-build decision for callers that may already hold a sink.

use super::core::{SinkConfig, SinkOne};
use crate::error::SinkError;

/// Where a sink comes from: an existing instance to attach to, or the
/// configuration for a fresh one.
#[derive(Debug)]
pub enum SinkSeed<T, E = SinkError> {
    Existing(SinkOne<T, E>),
    Fresh(SinkConfig),
}

impl<T, E> SinkSeed<T, E>
where
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Resolve to a sink, reusing the existing one if there is one.
    pub fn into_sink(self) -> SinkOne<T, E> {
        match self {
            SinkSeed::Existing(sink) => sink,
            SinkSeed::Fresh(config) => SinkOne::with_config(config),
        }
    }
}

impl<T, E> From<SinkOne<T, E>> for SinkSeed<T, E> {
    fn from(sink: SinkOne<T, E>) -> Self {
        SinkSeed::Existing(sink)
    }
}

impl<T, E> From<SinkConfig> for SinkSeed<T, E> {
    fn from(config: SinkConfig) -> Self {
        SinkSeed::Fresh(config)
    }
}

impl<T, E> Default for SinkSeed<T, E> {
    fn default() -> Self {
        SinkSeed::Fresh(SinkConfig::default())
    }
}
