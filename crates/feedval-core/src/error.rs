//! # Error Types
//!
//! Errors raised while mapping a document onto the typed feed model.
//!
//! These describe user data, not programming faults: callers turn them
//! into report entries. A document that passed the bundled feeds schema
//! always decodes; a decode error means the schema in use was looser than
//! the typed model.

use thiserror::Error;

use crate::document::NodeKind;

/// Error decoding a document into [`FeedConfig`](crate::FeedConfig) entries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    /// The document root is not an array of feeds.
    #[error("document root must be an array of feed configurations, found {found}")]
    NotAnArray {
        /// Kind of the root node actually present.
        found: NodeKind,
    },

    /// A single feed entry could not be decoded.
    #[error("feed[{index}] cannot be decoded: {reason}")]
    Feed {
        /// Position of the entry in the document.
        index: usize,
        /// Decoder message, including the offending field where known.
        reason: String,
    },
}

impl DecodeError {
    /// Index of the offending feed, if the error is feed-scoped.
    pub fn feed_index(&self) -> Option<usize> {
        match self {
            Self::NotAnArray { .. } => None,
            Self::Feed { index, .. } => Some(*index),
        }
    }
}

/// Error resolving the ingestion-source variant of a feed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// None of the source keys is present.
    #[error("no ingestion source declared; expected exactly one of file-watcher, kafka-file-replay, kafka-topic")]
    Missing,

    /// More than one source key is present.
    #[error("multiple ingestion sources declared ({0}); expected exactly one")]
    Ambiguous(String),
}

/// Error assembling a feed entry from its document fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShapeError {
    /// `name` is empty or whitespace.
    #[error("feed name must not be empty")]
    EmptyName,

    /// The ingestion source could not be resolved.
    #[error(transparent)]
    Source(#[from] SourceError),
}
