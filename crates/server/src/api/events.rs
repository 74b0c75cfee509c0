//! Server-sent events stream for realtime alert fan-out.

use crate::AppResources;
use axum::Extension;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::Stream;
use std::convert::Infallible;
use tokio_stream::StreamExt;
use tokio_stream::wrappers::UnboundedReceiverStream;

/// Tag for OpenAPI documentation.
pub const EVENTS_TAG: &str = "Events API";

/// Subscribe to the realtime event stream.
///
/// Delivery is fire-and-forget: events published while a client is
/// disconnected are not replayed.
#[tracing::instrument(skip(resources))]
#[utoipa::path(
    get,
    path = "/api/events",
    operation_id = "Event Stream",
    tag = EVENTS_TAG,
    summary = "Server-sent events stream of emergency alerts",
    responses(
        (status = 200, description = "SSE stream; each `emergency_alert` event carries `{bloodType, region}`", content_type = "text/event-stream")
    )
)]
pub async fn events(
    Extension(resources): Extension<AppResources>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (id, rx) = resources.broadcaster.subscribe();
    tracing::debug!(
        name = "api.events.subscribed",
        target = concat!(env!("CARGO_PKG_NAME"), "::", module_path!()),
        subscriber = %id,
        message = "SSE client subscribed"
    );

    let stream = UnboundedReceiverStream::new(rx).map(|event| {
        Ok(Event::default()
            .event(event.event)
            .data(event.payload.to_string()))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
