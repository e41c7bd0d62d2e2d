use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use tokio::sync::broadcast::error::RecvError;

use crate::{notifier::InventoryEvent, services::inventory_service, state::AppState};

#[utoipa::path(
    get,
    path = "/ws",
    responses(
        (status = 101, description = "WebSocket carrying inventoryUpdate and lowStockAlert events")
    ),
    tag = "Realtime"
)]
pub async fn inventory_socket(ws: WebSocketUpgrade, State(state): State<AppState>) -> Response {
    ws.on_upgrade(move |socket| stream_inventory(socket, state))
}

async fn send_event(socket: &mut WebSocket, event: &InventoryEvent) -> bool {
    socket
        .send(Message::Text(event.to_json().into()))
        .await
        .is_ok()
}

async fn stream_inventory(mut socket: WebSocket, state: AppState) {
    // subscribe before reading the snapshot so no change slips in between
    let mut rx = state.notifier.subscribe();
    tracing::debug!(subscribers = state.notifier.subscriber_count(), "inventory socket opened");

    match inventory_service::snapshot(&state.orm).await {
        Ok(items) => {
            for event in state.notifier.events_for(items) {
                if !send_event(&mut socket, &event).await {
                    return;
                }
            }
        }
        Err(err) => tracing::warn!(error = %err, "initial inventory snapshot failed"),
    }

    loop {
        tokio::select! {
            event = rx.recv() => match event {
                Ok(event) => {
                    if !send_event(&mut socket, &event).await {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "inventory socket lagged");
                }
                Err(RecvError::Closed) => break,
            },
            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("inventory socket closed");
}
