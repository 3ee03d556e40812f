//! Server-Sent Events support

use crate::runtime::WidgetEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

/// Convert broadcast stream to SSE stream
pub fn sse_stream(
    init_event: WidgetEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<WidgetEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    // Create stream that starts with init event then broadcasts
    let init = futures::stream::once(async move { Ok(widget_event_to_axum(init_event)) });

    let broadcasts = BroadcastStream::new(broadcast_rx).filter_map(|result| match result {
        Ok(event) => Some(Ok(widget_event_to_axum(event))),
        Err(_) => None, // Skip lagged messages
    });

    let combined = init.chain(broadcasts);

    Sse::new(combined).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("ping"),
    )
}

fn widget_event_to_axum(event: WidgetEvent) -> Event {
    let (event_type, data) = event_payload(event);
    Event::default().event(event_type).data(data.to_string())
}

fn event_payload(event: WidgetEvent) -> (&'static str, serde_json::Value) {
    match event {
        WidgetEvent::Init { snapshot } => (
            "init",
            json!({
                "type": "init",
                "widget": snapshot
            }),
        ),
        WidgetEvent::Message { message } => (
            "message",
            json!({
                "type": "message",
                "message": message
            }),
        ),
        WidgetEvent::StateChange { state } => (
            "state_change",
            json!({
                "type": "state_change",
                "state": state,
                "is_composing": state.is_composing()
            }),
        ),
        WidgetEvent::Panel { visibility } => (
            "panel",
            json!({
                "type": "panel",
                "visibility": visibility,
                "is_open": visibility.is_open()
            }),
        ),
        WidgetEvent::AgentDone => (
            "agent_done",
            json!({
                "type": "agent_done"
            }),
        ),
        WidgetEvent::Error { message } => (
            "error",
            json!({
                "type": "error",
                "message": message
            }),
        ),
    }
}
