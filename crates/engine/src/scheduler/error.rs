use std::fmt;

use crate::math::ScaleError;
use crate::merge::MergeError;

#[derive(Debug, Clone, PartialEq)]
pub enum TickError {
    Merge(MergeError),
    Scale(ScaleError),
    Panicked(String),
    Cancelled,
}

impl fmt::Display for TickError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge(e) => write!(f, "merge: {e}"),
            Self::Scale(e) => write!(f, "statistic: {e}"),
            Self::Panicked(msg) => write!(f, "tick panicked: {msg}"),
            Self::Cancelled => write!(f, "tick cancelled"),
        }
    }
}

impl std::error::Error for TickError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Merge(e) => Some(e),
            Self::Scale(e) => Some(e),
            _ => None,
        }
    }
}

impl From<MergeError> for TickError {
    fn from(e: MergeError) -> Self {
        Self::Merge(e)
    }
}

impl From<ScaleError> for TickError {
    fn from(e: ScaleError) -> Self {
        Self::Scale(e)
    }
}

impl From<tokio::task::JoinError> for TickError {
    fn from(e: tokio::task::JoinError) -> Self {
        if !e.is_panic() {
            return Self::Cancelled;
        }
        let payload = e.into_panic();
        let msg = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic payload".into());
        Self::Panicked(msg)
    }
}
