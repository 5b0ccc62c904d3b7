//! Error types for the layout engine.
//!
//! This module defines all error types that can occur while ingesting page
//! fragments, validating configuration and reconstructing reading order.

use crate::layout::FragmentId;

/// Result type alias for layout engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur during layout reconstruction.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)] // "Invalid" prefix is intentional for clarity
pub enum Error {
    /// A configuration value is outside its documented range
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// An ingested fragment carries unusable geometry
    #[error("Invalid fragment at index {index}: {reason}")]
    InvalidFragment {
        /// Position of the fragment in the page input
        index: usize,
        /// Reason the fragment was rejected
        reason: String,
    },

    /// Page dimensions are unusable
    #[error("Invalid page: {0}")]
    InvalidPage(String),

    /// A source fragment is missing from every merged fragment
    #[error("Fragment {id} was dropped during merging")]
    FragmentDropped {
        /// The missing fragment
        id: FragmentId,
    },

    /// A source fragment is owned by more than one merged fragment
    #[error("Fragment {id} appears in more than one merged fragment")]
    DuplicateFragment {
        /// The duplicated fragment
        id: FragmentId,
    },

    /// Processing of one page of a document failed
    #[error("Page {page}: {source}")]
    PageFailed {
        /// Page number as given in the input
        page: u32,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
