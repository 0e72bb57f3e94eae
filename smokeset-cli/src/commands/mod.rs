//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command.

/// Frame extraction from labeled videos.
pub mod extract;
/// Sequence-level train/validation/test splitting.
pub mod split;
pub mod subsample;
