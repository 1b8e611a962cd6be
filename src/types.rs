//! Core types for the sink.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a subscription handle, unique per sink.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HandleId(pub u64);

impl fmt::Debug for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandleId({})", self.0)
    }
}

impl fmt::Display for HandleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Termination state of a sink. Moves away from `Pending` at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Termination {
    Pending = 0,
    Succeeded = 1,
    Failed = 2,
}

impl Termination {
    pub(crate) fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Termination::Succeeded,
            2 => Termination::Failed,
            _ => Termination::Pending,
        }
    }

    pub fn is_terminated(self) -> bool {
        self != Termination::Pending
    }
}

/// The terminal result cached by a sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Outcome<T, E> {
    /// Completed with a value.
    Value(T),
    /// Completed without a value.
    Empty,
    /// Terminated with an error.
    Error(E),
}

impl<T, E> Outcome<T, E> {
    pub(crate) fn from_success(value: Option<T>) -> Self {
        match value {
            Some(value) => Outcome::Value(value),
            None => Outcome::Empty,
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Value(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&E> {
        match self {
            Outcome::Error(error) => Some(error),
            _ => None,
        }
    }

    /// Which termination this outcome corresponds to.
    pub fn termination(&self) -> Termination {
        match self {
            Outcome::Value(_) | Outcome::Empty => Termination::Succeeded,
            Outcome::Error(_) => Termination::Failed,
        }
    }

    /// `Ok(Some(v))` for a value, `Ok(None)` for empty completion.
    pub fn into_result(self) -> Result<Option<T>, E> {
        match self {
            Outcome::Value(value) => Ok(Some(value)),
            Outcome::Empty => Ok(None),
            Outcome::Error(error) => Err(error),
        }
    }
}

/// A protocol signal as observed by a consumer.
///
/// A subscription yields `Subscribed`, then at most one `Next`, then exactly
/// one of `Complete` or `Error` unless it was cancelled first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Signal<T, E> {
    Subscribed,
    Next(T),
    Complete,
    Error(E),
}

impl<T, E> Signal<T, E> {
    /// True for `Complete` and `Error`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Signal::Complete | Signal::Error(_))
    }
}

/// Point-in-time summary of a sink.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SinkStats {
    pub label: String,
    pub termination: Termination,
    /// Live (registered, not yet removed) subscribers. Zero once terminated.
    pub subscribers: usize,
}
