//! Per-connection handler: wait for `join`, register, then pump events
//! between the socket, the matchmaker and the event bus.

use std::net::SocketAddr;
use std::time::Duration;

use duet_common::{Event, Handle, ProtocolError};
use duet_config::DuetConfig;
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

use crate::lifecycle::Matchmaker;
use crate::protocol::{parse_client_event, ClientEvent, ServerEvent, SignalKind};
use crate::rate_limit::RelayBudget;

type WsStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;
type WsSink = futures_util::stream::SplitSink<WsStream, Message>;
type WsSource = futures_util::stream::SplitStream<WsStream>;

/// Limits applied to every connection.
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub join_timeout: Duration,
    pub outbox_capacity: usize,
    pub max_message_length: usize,
    pub relay_rate_per_sec: u32,
    pub relay_burst: u32,
}

impl From<&DuetConfig> for ConnectionSettings {
    fn from(config: &DuetConfig) -> Self {
        Self {
            join_timeout: Duration::from_secs(u64::from(config.server.join_timeout_secs)),
            outbox_capacity: config.matching.outbox_capacity as usize,
            max_message_length: config.relay.max_message_length as usize,
            relay_rate_per_sec: config.relay.rate_per_sec,
            relay_burst: config.relay.burst,
        }
    }
}

/// Handle a single WebSocket connection.
pub async fn handle_connection(
    ws: WsStream,
    addr: SocketAddr,
    matchmaker: Matchmaker,
    settings: ConnectionSettings,
) {
    let (mut sink, mut stream) = ws.split();
    let handle = Handle::new();

    // 1. The first frame must be a join.
    let (name, location) = match read_join(&mut stream, addr, settings.join_timeout).await {
        Some(Ok(profile)) => profile,
        Some(Err(e)) => {
            let _ = send_event(&mut sink, &ServerEvent::error(&e)).await;
            let _ = sink.send(Message::Close(None)).await;
            return;
        }
        None => return,
    };

    // 2. Register with a fresh outbox. The first count this client sees is
    // the one its own registration publishes.
    let (tx, mut rx) = mpsc::channel::<ServerEvent>(settings.outbox_capacity);
    let mut bus = matchmaker.events().subscribe();
    let mut budget = RelayBudget::new(settings.relay_rate_per_sec, settings.relay_burst);
    let profile = matchmaker
        .register(handle.clone(), name, location, tx.clone())
        .await;

    tracing::info!(peer = %addr, handle = %handle, "Client registered");

    if send_event(&mut sink, &ServerEvent::Registered { profile })
        .await
        .is_err()
    {
        matchmaker.disconnect(&handle).await;
        return;
    }

    // 3. Forwarding loop.
    loop {
        tokio::select! {
            // Engine → this client
            Some(event) = rx.recv() => {
                if send_event(&mut sink, &event).await.is_err() {
                    break;
                }
            }

            // Process-wide events
            event = bus.recv() => match event {
                Ok(Event::OnlineCount(count)) => {
                    if send_event(&mut sink, &ServerEvent::OnlineCount { count }).await.is_err() {
                        break;
                    }
                }
                Ok(Event::Shutdown) | Err(RecvError::Closed) => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(handle = %handle, skipped, "Event bus lagged");
                }
            },

            // This client → engine
            frame = stream.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => {
                        if let Err(e) = dispatch(&matchmaker, &handle, &tx, &settings, &mut budget, &text).await {
                            tracing::warn!(handle = %handle, error = %e, "Rejected client event");
                            if send_event(&mut sink, &ServerEvent::error(&e)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Ping(data))) => {
                        let _ = sink.send(Message::Pong(data)).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(peer = %addr, error = %e, "WS error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    // 4. Cleanup.
    tracing::info!(peer = %addr, handle = %handle, "Client disconnected");
    matchmaker.disconnect(&handle).await;
}

/// Route one inbound frame to the matchmaker.
async fn dispatch(
    matchmaker: &Matchmaker,
    handle: &Handle,
    tx: &mpsc::Sender<ServerEvent>,
    settings: &ConnectionSettings,
    budget: &mut RelayBudget,
    text: &str,
) -> Result<(), ProtocolError> {
    let event = parse_client_event(text)?;
    if event.is_relayed() && !budget.try_take() {
        return Err(ProtocolError::RateLimited);
    }

    match event {
        ClientEvent::Join { name, location } => {
            let profile = matchmaker
                .register(handle.clone(), name, location, tx.clone())
                .await;
            if tx.try_send(ServerEvent::Registered { profile }).is_err() {
                tracing::warn!(handle = %handle, "Outbox full, dropping registration ack");
            }
        }
        ClientEvent::FindPartner => {
            matchmaker.request_pairing(handle).await;
        }
        ClientEvent::SendMessage { content } => {
            let len = content.chars().count();
            if len > settings.max_message_length {
                return Err(ProtocolError::MessageTooLong {
                    len,
                    max: settings.max_message_length,
                });
            }
            matchmaker.relay_message(handle, content).await;
        }
        ClientEvent::SignalOffer { target, payload } => {
            matchmaker
                .relay_signal(handle, &target, SignalKind::Offer, payload)
                .await;
        }
        ClientEvent::SignalAnswer { target, payload } => {
            matchmaker
                .relay_signal(handle, &target, SignalKind::Answer, payload)
                .await;
        }
        ClientEvent::SignalCandidate { target, payload } => {
            matchmaker
                .relay_signal(handle, &target, SignalKind::Candidate, payload)
                .await;
        }
        ClientEvent::SkipPartner => {
            matchmaker.skip(handle).await;
        }
        ClientEvent::ReportPartner { reason } => {
            matchmaker.report(handle, reason).await;
        }
        ClientEvent::LikePartner => {
            matchmaker.like(handle).await;
        }
    }
    Ok(())
}

/// Read the first frame and require it to be a `join`.
///
/// `None` means the connection went away (or timed out) before saying
/// anything usable and should be dropped without a reply.
async fn read_join(
    stream: &mut WsSource,
    addr: SocketAddr,
    timeout: Duration,
) -> Option<Result<(Option<String>, Option<String>), ProtocolError>> {
    let frame = tokio::time::timeout(timeout, stream.next()).await;

    match frame {
        Ok(Some(Ok(Message::Text(text)))) => match parse_client_event(&text) {
            Ok(ClientEvent::Join { name, location }) => Some(Ok((name, location))),
            Ok(_) => {
                tracing::warn!(peer = %addr, "Event before join");
                Some(Err(ProtocolError::NotJoined))
            }
            Err(e) => {
                tracing::warn!(peer = %addr, error = %e, "Invalid join message");
                Some(Err(e))
            }
        },
        Ok(Some(Ok(_))) => {
            tracing::warn!(peer = %addr, "Expected text join, got another frame type");
            Some(Err(ProtocolError::NotJoined))
        }
        Ok(Some(Err(e))) => {
            tracing::warn!(peer = %addr, error = %e, "WS error during join");
            None
        }
        Ok(None) => {
            tracing::debug!(peer = %addr, "Connection closed before join");
            None
        }
        Err(_) => {
            tracing::warn!(peer = %addr, ?timeout, "Join timeout");
            None
        }
    }
}

/// Send a `ServerEvent` as a JSON text frame.
async fn send_event(
    sink: &mut WsSink,
    event: &ServerEvent,
) -> Result<(), tokio_tungstenite::tungstenite::Error> {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            tracing::warn!(error = %e, "Failed to encode event");
            return Ok(());
        }
    };
    sink.send(Message::Text(json.into())).await
}
