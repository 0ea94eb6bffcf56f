//! Core traits for the feature pipeline.
//!
//! This module defines the `TokenNormalizer` trait so the stemming stage can
//! be swapped (Porter2 stemming by default, identity for raw tokens).

/// Maps a single token to its canonical form.
///
/// ## Design Note
/// - `Send + Sync` lets the pipeline normalize tags in parallel with Rayon
/// - Implementations must be pure: the same token always maps to the same
///   output, regardless of its position or neighbours
pub trait TokenNormalizer: Send + Sync {
    /// Returns the name of this normalizer (for logging/debugging)
    fn name(&self) -> &str;

    /// Normalize one whitespace-free token.
    fn normalize_token(&self, token: &str) -> String;

    /// Normalize every whitespace-separated token of `text` and rejoin
    /// them with single spaces, preserving order.
    fn normalize_text(&self, text: &str) -> String {
        text.split_whitespace()
            .map(|token| self.normalize_token(token))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
