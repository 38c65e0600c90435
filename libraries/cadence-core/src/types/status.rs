//! Lifecycle tag for asynchronously produced values
use serde::{Deserialize, Serialize};

/// Status of an asynchronously derived value
///
/// Starts `Empty`, becomes `Pending` when work is enqueued, and settles on
/// `Completed` or `Rejected`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    /// Nothing requested yet
    #[default]
    Empty,
    /// Work in flight
    Pending,
    /// Work finished successfully
    Completed,
    /// Work failed
    Rejected,
}

impl OperationStatus {
    /// Convert to string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Pending => "pending",
            Self::Completed => "completed",
            Self::Rejected => "rejected",
        }
    }

    /// Whether the value has settled (completed or rejected)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Rejected)
    }
}

impl std::fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
