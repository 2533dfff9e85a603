//! Domain error types for ReqDelta.
//!
//! These errors represent domain-level failures that can occur while
//! classifying and loading requirement items. Infrastructure failures
//! (git, filesystem, rendering) are propagated as `anyhow` errors with
//! context at the call site.

use thiserror::Error;

/// Domain errors related to requirement item handling.
#[derive(Debug, Error)]
pub enum ItemError {
    #[error("'{path}' extension for item format '{ext}' not valid")]
    UnknownExtension { path: String, ext: String },

    #[error("item front matter is not terminated")]
    UnterminatedFrontMatter,

    #[error("item is not a top-level mapping")]
    NotAMapping,

    #[error("invalid item content: {0}")]
    InvalidContent(#[from] serde_yaml::Error),
}
