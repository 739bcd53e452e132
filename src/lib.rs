//! Rune motion: intro/outro transitions for the rune view tree.
//!
//! Re-exports the transition engine and its configuration loader.

pub use rune_config as config;
pub use rune_transition as transition;
