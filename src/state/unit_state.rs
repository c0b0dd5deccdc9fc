/// Unit state definitions for tracking crawl progress
///
/// A unit is anything the run writes out: a document, an image or a PDF.
use std::fmt;

/// Represents the current state of a unit in the crawl process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitState {
    // ===== Active States =====
    /// Unit has been discovered but not yet fetched
    Discovered,

    /// Source content has been fetched (or read from the cache)
    Fetched,

    /// A conversion task for the unit is waiting in the queue
    Queued,

    /// Conversion hit an unmapped link and was requeued with this many retries left
    Deferred(u32),

    // ===== Terminal States =====
    /// Output was written, or already existed
    Converted,

    /// Conversion failed permanently
    Failed,
}

impl UnitState {
    /// Returns true if this is a terminal state (no further processing needed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Converted | Self::Failed)
    }

    /// Returns true if this represents a successful completion
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Converted)
    }

    /// Short label used in logs and reports
    pub fn label(&self) -> &'static str {
        match self {
            Self::Discovered => "discovered",
            Self::Fetched => "fetched",
            Self::Queued => "queued",
            Self::Deferred(_) => "deferred",
            Self::Converted => "converted",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Deferred(retries) => write!(f, "deferred ({} retries left)", retries),
            other => write!(f, "{}", other.label()),
        }
    }
}
