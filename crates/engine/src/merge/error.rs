use std::fmt;
use std::time::Duration;

use crate::math::ScaleError;
use crate::pool::PoolError;

#[derive(Debug, Clone, PartialEq)]
pub enum MergeError {
    /// Not every chunk reported back before the wait bound expired.
    Timeout { waited: Duration, pending: usize },
    /// A chunk job vanished without reporting (panicked or was dropped).
    Interrupted { pending: usize },
    Rejected(PoolError),
    Scale(ScaleError),
}

impl fmt::Display for MergeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Timeout { waited, pending } => write!(
                f,
                "processing of merged captures failed: {pending} chunk(s) still pending after {}ms",
                waited.as_millis()
            ),
            Self::Interrupted { pending } => write!(
                f,
                "processing of merged captures failed: {pending} chunk(s) lost before reporting"
            ),
            Self::Rejected(e) => write!(f, "processing of merged captures failed: {e}"),
            Self::Scale(e) => write!(f, "processing of merged captures failed: {e}"),
        }
    }
}

impl std::error::Error for MergeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Rejected(e) => Some(e),
            Self::Scale(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PoolError> for MergeError {
    fn from(e: PoolError) -> Self {
        Self::Rejected(e)
    }
}

impl From<ScaleError> for MergeError {
    fn from(e: ScaleError) -> Self {
        Self::Scale(e)
    }
}
