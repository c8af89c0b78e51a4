//! Server-sent-event relay.
//!
//! Handlers hand a stream of records to this module and get back a
//! `text/event-stream` response that forwards each record the moment it
//! arrives. Every record travels as a JSON document in the event's `data`
//! field: completed sections as `{"type": <label>, "data": <content>}`,
//! chat deltas as `{"data": <fragment>}`. Responses disable caching and
//! carry periodic keep-alive comments so idle proxies keep the connection
//! open while the upstream model is still thinking.

use std::convert::Infallible;

use axum::http::header;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::{Stream, StreamExt};
use guru_core::SectionEvent;
use serde::Serialize;
use tracing::warn;

/// Chat deltas carry no section identity, only text.
#[derive(Debug, Serialize)]
struct ChatRecord {
    data: String,
}

/// Relays demultiplexed sections to the client as they complete.
pub fn section_response<S>(sections: S) -> Response
where
    S: Stream<Item = SectionEvent> + Send + 'static,
{
    sse_response(sections)
}

/// Relays raw text fragments to the client as they arrive.
pub fn fragment_response<S>(fragments: S) -> Response
where
    S: Stream<Item = String> + Send + 'static,
{
    sse_response(fragments.map(|data| ChatRecord { data }))
}

fn sse_response<S, T>(records: S) -> Response
where
    S: Stream<Item = T> + Send + 'static,
    T: Serialize + Send + 'static,
{
    let events = records.filter_map(|record| async move {
        match Event::default().json_data(&record) {
            Ok(event) => Some(Ok::<_, Infallible>(event)),
            Err(error) => {
                warn!(error = %error, "dropping unserializable relay record");
                None
            }
        }
    });
    (
        [(header::CACHE_CONTROL, "no-cache")],
        Sse::new(events).keep_alive(KeepAlive::default()),
    )
        .into_response()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
