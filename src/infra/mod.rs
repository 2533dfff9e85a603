//! Infrastructure layer (adapters/implementations).
//!
//! This module contains IO-heavy integrations (git, filesystem staging).

pub mod staging;
pub mod vcs;
