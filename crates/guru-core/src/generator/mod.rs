//! The `Generator` trait -- the seam between the pipeline and whichever
//! provider produces the token stream.
//!
//! The trait is intentionally object-safe so handlers can hold an
//! `Arc<dyn Generator>` and tests can swap in a scripted fake.

mod gemini;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

pub use gemini::{DEFAULT_MODEL, GeminiClient};

/// The fragment sequence produced by a streaming generation.
///
/// Items are text fragments in arrival order; concatenated, they
/// reconstruct the full model output. Fragment boundaries carry no
/// meaning -- tags and words may be split anywhere. An `Err` item is a
/// fragment that could not be decoded; consumers log and skip it.
pub type FragmentStream = Pin<Box<dyn Stream<Item = Result<String, GeneratorError>> + Send>>;

/// Errors from the generation provider.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// Transport-level failure talking to the provider.
    #[error("request to generation provider failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider refused the request outright.
    #[error("generation provider returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// A streamed payload could not be decoded.
    #[error("undecodable stream payload: {0}")]
    Decode(String),
}

/// A streaming text-generation provider.
///
/// Failure to establish the stream is the returned `Err` and is terminal
/// for the whole operation. Failures on individual fragments after
/// establishment arrive as `Err` items inside the stream and are
/// recoverable: consumers skip them and keep reading.
#[async_trait]
pub trait Generator: Send + Sync {
    /// Provider name for logging (e.g. "gemini").
    fn name(&self) -> &str;

    /// Start a streaming generation for `prompt`.
    async fn stream(&self, prompt: &str) -> Result<FragmentStream, GeneratorError>;
}

// Handlers store `Arc<dyn Generator>`; keep the trait object-safe.
const _: () = {
    fn _assert_object_safe(_: &dyn Generator) {}
};
