//! Core pipeline for guru -- turning one continuous model token stream
//! into discrete, independently deliverable lesson-planning documents.
//!
//! The pieces, in stream order:
//!
//! 1. [`generator`] -- the upstream seam. A [`generator::Generator`]
//!    produces text fragments for a prompt; the production implementation
//!    is [`generator::GeminiClient`].
//! 2. [`demux`] -- the tagged-section demultiplexer. Fragments accumulate
//!    in a buffer and a [`section::SectionEvent`] is emitted as soon as
//!    each tagged document completes, without waiting for the rest of the
//!    stream.
//! 3. [`prompt`] -- builders for the Indonesian instruction text that
//!    makes the model bracket every document with the tags its
//!    [`section`] catalog declares.

pub mod demux;
pub mod generator;
pub mod prompt;
pub mod section;

pub use demux::{SectionDemux, demux_stream};
pub use generator::{FragmentStream, Generator, GeneratorError};
pub use section::{SectionDescriptor, SectionEvent};
