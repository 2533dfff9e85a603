//! Application layer (use-cases, policies).
//!
//! This module orchestrates the domain model: annotating patched files,
//! deciding which changes are normative, and publishing the staged tree.

pub mod annotate;
pub mod config;
pub mod project;
pub mod publish;
