//! The real-time channel: a WebSocket that relays every notification bus
//! event to the connected listener as a JSON text frame.

use std::fmt::Display;

use log::{info, warn};
use rocket::{
    futures::{Sink, SinkExt, Stream, StreamExt},
    serde::json::serde_json,
    tokio::{
        self,
        sync::broadcast::{error::RecvError, Receiver},
    },
    Route, State,
};
use rocket_ws::{frame::CloseFrame, Channel, Message, WebSocket};

use crate::logging::ConnectionId;
use crate::notify::{Notification, NotificationBus};

pub fn routes() -> Vec<Route> {
    routes![events]
}

/// What to do next with a listener connection.
enum Step {
    Forward(Notification),
    Close(String),
}

#[get("/events")]
fn events(ws: WebSocket, bus: &State<NotificationBus>) -> Channel<'static> {
    let bus = bus.inner().clone();

    ws.channel(move |stream| {
        Box::pin(async move {
            let id = ConnectionId::next();
            let notifications = bus.subscribe();
            info!("Hello client #{id}");

            let (sink, source) = stream.split();
            let reason = relay(id, sink, source, notifications).await;

            info!("Goodbye client #{id} ({reason})");
            Ok(())
        })
    })
}

/// Forward notifications to a listener until the connection ends, returning
/// why it ended.
async fn relay<Si, St, E>(
    id: ConnectionId,
    mut sink: Si,
    mut source: St,
    mut notifications: Receiver<Notification>,
) -> String
where
    Si: Sink<Message> + Unpin,
    Si::Error: Display,
    St: Stream<Item = Result<Message, E>> + Unpin,
    E: Display,
{
    loop {
        let step = tokio::select! {
            received = notifications.recv() => match received {
                Ok(notification) => Step::Forward(notification),
                Err(RecvError::Lagged(missed)) => {
                    warn!("Client #{id} fell behind, skipped {missed} event(s)");
                    continue;
                }
                Err(RecvError::Closed) => Step::Close("server shutting down".to_string()),
            },
            message = source.next() => match message {
                Some(Ok(Message::Close(frame))) => Step::Close(close_reason(frame)),
                // Listeners have nothing to say to us.
                Some(Ok(_)) => continue,
                Some(Err(e)) => Step::Close(e.to_string()),
                None => Step::Close("stream ended".to_string()),
            },
        };

        match step {
            Step::Forward(notification) => {
                let frame = match serde_json::to_string(&notification) {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!("Failed to encode {} for client #{id}: {e}", notification.name());
                        continue;
                    }
                };
                if let Err(e) = sink.send(Message::Text(frame)).await {
                    break e.to_string();
                }
            }
            Step::Close(reason) => break reason,
        }
    }
}

/// Describe why the peer closed the connection, as given in its close frame.
fn close_reason(frame: Option<CloseFrame<'_>>) -> String {
    match frame {
        Some(frame) if frame.reason.is_empty() => format!("code {}", u16::from(frame.code)),
        Some(frame) => format!("code {}: {}", u16::from(frame.code), frame.reason),
        None => "closed without reason".to_string(),
    }
}
