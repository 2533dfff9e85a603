//! Domain types for ReqDelta.
//! Defines the requirement item and document structures used throughout the
//! application.

pub mod document;
pub mod error;
pub mod item;

pub use document::*;
pub use error::*;
pub use item::*;
