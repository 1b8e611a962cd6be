//! Error types for the sink.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Main error type carried by sinks and returned by signal receivers.
///
/// Cloneable so that a single failure can be replayed to every subscriber.
#[derive(Clone, Debug, Error)]
pub enum SinkError {
    #[error("Producer failed: {0}")]
    Failed(String),

    #[error(transparent)]
    External(Arc<dyn std::error::Error + Send + Sync>),

    #[error("Signal channel disconnected")]
    Disconnected,

    #[error("Signal channel empty")]
    Empty,

    #[error("No signal received within {0:?}")]
    Timeout(Duration),
}

impl SinkError {
    /// Failure described by a message.
    pub fn failed(message: impl Into<String>) -> Self {
        SinkError::Failed(message.into())
    }

    /// Wrap a foreign error without reinterpreting it.
    pub fn external<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        SinkError::External(Arc::new(error))
    }
}

impl From<crossbeam_channel::RecvError> for SinkError {
    fn from(_: crossbeam_channel::RecvError) -> Self {
        SinkError::Disconnected
    }
}

impl From<crossbeam_channel::TryRecvError> for SinkError {
    fn from(e: crossbeam_channel::TryRecvError) -> Self {
        match e {
            crossbeam_channel::TryRecvError::Empty => SinkError::Empty,
            crossbeam_channel::TryRecvError::Disconnected => SinkError::Disconnected,
        }
    }
}

/// Result type for receiver operations.
pub type Result<T> = std::result::Result<T, SinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        let err = SinkError::external(io);
        assert_eq!(err.to_string(), "disk on fire");

        let cloned = err.clone();
        assert_eq!(cloned.to_string(), err.to_string());
    }

    #[test]
    fn test_try_recv_mapping() {
        assert!(matches!(
            SinkError::from(crossbeam_channel::TryRecvError::Empty),
            SinkError::Empty
        ));
        assert!(matches!(
            SinkError::from(crossbeam_channel::TryRecvError::Disconnected),
            SinkError::Disconnected
        ));
    }
}
