//! Live dashboard WebSocket
//!
//! GET /api/live/ws?token=<JWT>[&status=pending]
//! Auth: JWT in the query string (browser WebSockets cannot set headers)
//!
//! Protocol:
//! - server → dashboard: FeedMessage (Ready, Orders, Stats, Error)
//! - dashboard → server: FeedCommand (SetFilter, RefreshStats)

use axum::Router;
use axum::extract::Query;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use shared::console::{FeedCommand, FeedMessage};
use shared::error::{AppError, ErrorCode};
use shared::order::OrderStatus;
use tokio::time::Duration;

use crate::live::ConnectionGuard;
use crate::services::OrderFeed;
use crate::state::{AppState, Backend};

/// Maximum concurrent live connections per restaurant
const MAX_LIVE_WS_PER_TENANT: usize = 10;

const PING_INTERVAL: Duration = Duration::from_secs(30);

pub fn router() -> Router<AppState> {
    Router::new().route("/api/live/ws", get(handle_live_ws))
}

#[derive(Deserialize)]
pub struct LiveQuery {
    token: String,
    #[serde(default)]
    status: Option<OrderStatus>,
}

/// GET /api/live/ws?token=<JWT>
pub async fn handle_live_ws(
    backend: Backend,
    Query(query): Query<LiveQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, AppError> {
    let (tenant_id, guard) = admit(&backend, &query.token)?;

    Ok(ws.on_upgrade(move |socket| {
        live_session(socket, backend, tenant_id, query.status, guard)
    }))
}

/// Authenticate the query token and take one of the tenant's live slots.
fn admit(backend: &Backend, token: &str) -> Result<(String, ConnectionGuard), AppError> {
    let identity = backend.auth.authenticate(token)?;
    let guard = backend
        .live_connections
        .try_acquire(&identity.tenant_id, MAX_LIVE_WS_PER_TENANT)
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::RateLimited,
                format!("Too many live connections (max {MAX_LIVE_WS_PER_TENANT})"),
            )
        })?;
    Ok((identity.tenant_id, guard))
}

async fn live_session(
    socket: WebSocket,
    backend: Backend,
    tenant_id: String,
    status: Option<OrderStatus>,
    _guard: ConnectionGuard,
) {
    let (mut sink, mut stream) = socket.split();
    tracing::info!(tenant_id = %tenant_id, "Live WS connected");

    let mut feed = backend.orders.subscribe(&tenant_id, status);
    let Some(orders) = feed.recv().await else {
        return;
    };
    let stats = backend.dashboard.snapshot(&tenant_id).await;
    if send_message(&mut sink, &FeedMessage::Ready { orders, stats })
        .await
        .is_err()
    {
        return;
    }

    let mut ping_interval = tokio::time::interval(PING_INTERVAL);
    ping_interval.tick().await; // skip immediate
    let mut stats_interval = tokio::time::interval(Duration::from_secs(
        backend.dashboard.refresh_interval_secs(),
    ));
    stats_interval.tick().await;

    loop {
        tokio::select! {
            _ = ping_interval.tick() => {
                if sink.send(Message::Ping(Vec::new().into())).await.is_err() {
                    break;
                }
            }

            _ = stats_interval.tick() => {
                let stats = backend.dashboard.snapshot(&tenant_id).await;
                if send_message(&mut sink, &FeedMessage::Stats { stats }).await.is_err() {
                    break;
                }
            }

            snapshot = feed.recv() => {
                let Some(orders) = snapshot else { break };
                if send_message(&mut sink, &FeedMessage::Orders { orders }).await.is_err() {
                    break;
                }
            }

            msg = stream.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = apply_command(&backend, &tenant_id, &mut feed, &text).await;
                        if let Some(reply) = reply
                            && send_message(&mut sink, &reply).await.is_err()
                        {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    feed.cancel();
    tracing::info!(tenant_id = %tenant_id, "Live WS disconnected");
}

/// Handle one dashboard command; returns the reply to send, if any.
async fn apply_command(
    backend: &Backend,
    tenant_id: &str,
    feed: &mut OrderFeed,
    text: &str,
) -> Option<FeedMessage> {
    match serde_json::from_str::<FeedCommand>(text) {
        Ok(FeedCommand::SetFilter { status }) => {
            // New feed starts with the full filtered set
            feed.cancel();
            *feed = backend.orders.subscribe(tenant_id, status);
            None
        }
        Ok(FeedCommand::RefreshStats) => Some(FeedMessage::Stats {
            stats: backend.dashboard.snapshot(tenant_id).await,
        }),
        Err(e) => Some(FeedMessage::Error {
            code: ErrorCode::InvalidRequest,
            message: format!("Unrecognised command: {e}"),
        }),
    }
}

async fn send_message<S>(sink: &mut S, msg: &FeedMessage) -> Result<(), ()>
where
    S: futures::Sink<Message, Error = axum::Error> + Unpin,
{
    let json = serde_json::to_string(msg).map_err(|_| ())?;
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}
