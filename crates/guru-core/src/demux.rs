//! The tagged-section demultiplexer.
//!
//! The model returns one continuous token stream in which every document
//! is bracketed by a unique tag pair. [`SectionDemux`] accumulates the
//! stream in a single buffer and emits each section the moment both of
//! its tags have arrived, so callers can deliver early sections while
//! later ones are still being generated.
//!
//! One instance handles exactly one request. The buffer and cursor are
//! plain owned state, so concurrent requests never share anything.

use std::pin::Pin;

use futures::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::generator::GeneratorError;
use crate::section::{SectionDescriptor, SectionEvent};

/// Incremental extractor of tagged sections from a fragment stream.
///
/// Sections are expected in the exact order of the catalog handed to
/// [`SectionDemux::new`]. Each section is emitted at most once; a section
/// whose tags never arrive is simply never emitted, and neither is
/// anything after it.
#[derive(Debug)]
pub struct SectionDemux {
    descriptors: &'static [SectionDescriptor],
    buffer: String,
    cursor: usize,
}

impl SectionDemux {
    /// Create a demultiplexer awaiting the first section of `descriptors`.
    pub fn new(descriptors: &'static [SectionDescriptor]) -> Self {
        Self {
            descriptors,
            buffer: String::new(),
            cursor: 0,
        }
    }

    /// Whether every section in the catalog has been emitted.
    pub fn finished(&self) -> bool {
        self.cursor >= self.descriptors.len()
    }

    /// Name of the section currently awaited, or `None` once finished.
    pub fn awaiting(&self) -> Option<&'static str> {
        self.descriptors.get(self.cursor).map(|d| d.name)
    }

    /// Append one upstream fragment and return every section it completed.
    ///
    /// The fragment joins the accumulation buffer, then sections are
    /// extracted repeatedly while the awaited section's start and end tags
    /// are both present with the start strictly before the end. Extracted
    /// content is the text strictly between the tags, trimmed. Everything
    /// up to and including a consumed end tag is discarded from the buffer
    /// for good.
    ///
    /// Once the catalog is exhausted the stream must still be drained by
    /// the caller, but fragments are dropped here without buffering.
    pub fn feed(&mut self, fragment: &str) -> Vec<SectionEvent> {
        if self.finished() {
            return Vec::new();
        }

        self.buffer.push_str(fragment);

        let mut events = Vec::new();
        while let Some(descriptor) = self.descriptors.get(self.cursor) {
            let Some(start) = self.buffer.find(descriptor.start_tag) else {
                break;
            };
            let Some(end) = self.buffer.find(descriptor.end_tag) else {
                break;
            };
            let content_start = start + descriptor.start_tag.len();
            // Both tags must be present with the start strictly before the
            // end. A stray end tag ahead of the start never completes the
            // section; the buffer keeps accumulating.
            if end < content_start {
                break;
            }

            let content = self.buffer[content_start..end].trim().to_string();
            events.push(SectionEvent::new(descriptor, content));

            self.buffer.drain(..end + descriptor.end_tag.len());
            self.cursor += 1;
        }

        if self.finished() {
            // Nothing left to await; trailing text can never be attributed.
            self.buffer = String::new();
        }

        events
    }
}

/// Wrap a fragment stream into a stream of completed sections.
///
/// A fresh [`SectionDemux`] is created per call. Fragment-level errors
/// from the upstream are logged and skipped; the output stream ends when
/// the upstream ends, whether or not every section was found. Dropping
/// the returned stream drops the upstream with it.
pub fn demux_stream<S>(
    fragments: S,
    descriptors: &'static [SectionDescriptor],
) -> Pin<Box<dyn Stream<Item = SectionEvent> + Send>>
where
    S: Stream<Item = Result<String, GeneratorError>> + Send + 'static,
{
    let stream = async_stream::stream! {
        let mut demux = SectionDemux::new(descriptors);
        let mut fragments = Box::pin(fragments);

        while let Some(next) = fragments.next().await {
            match next {
                Ok(fragment) => {
                    for event in demux.feed(&fragment) {
                        debug!(section = %event.event_type, "section completed");
                        yield event;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "skipping undecodable fragment");
                }
            }
        }

        if let Some(name) = demux.awaiting() {
            debug!(awaiting = name, "upstream ended before all sections completed");
        }
    };

    Box::pin(stream)
}
