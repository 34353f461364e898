//! Wire protocol. Every frame is a JSON object tagged by `type`.
//!
//! Signaling payloads are carried as opaque JSON and never inspected.

use chrono::{DateTime, Utc};
use duet_common::{Handle, ProtocolError, RoomId};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::registry::Participant;

/// Events a client sends to the relay.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ClientEvent {
    Join {
        name: Option<String>,
        location: Option<String>,
    },
    FindPartner,
    SendMessage {
        content: String,
    },
    SignalOffer {
        target: Handle,
        payload: Value,
    },
    SignalAnswer {
        target: Handle,
        payload: Value,
    },
    SignalCandidate {
        target: Handle,
        payload: Value,
    },
    SkipPartner,
    ReportPartner {
        reason: Option<String>,
    },
    LikePartner,
}

impl ClientEvent {
    /// Chat and signal frames, which land in another participant's outbox.
    pub fn is_relayed(&self) -> bool {
        matches!(
            self,
            Self::SendMessage { .. }
                | Self::SignalOffer { .. }
                | Self::SignalAnswer { .. }
                | Self::SignalCandidate { .. }
        )
    }
}

/// Parse one inbound text frame.
pub fn parse_client_event(text: &str) -> Result<ClientEvent, ProtocolError> {
    serde_json::from_str(text).map_err(|e| ProtocolError::Malformed(e.to_string()))
}

/// Which leg of the media handshake a signal belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalKind {
    Offer,
    Answer,
    Candidate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Text,
}

/// A chat line as delivered to both members of a room.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender_handle: Handle,
    pub sender_name: String,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    pub kind: MessageKind,
}

/// Events the relay sends to a client.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ServerEvent {
    Registered {
        profile: Participant,
    },
    OnlineCount {
        count: usize,
    },
    PartnerFound {
        partner: Participant,
        room_id: RoomId,
    },
    NewMessage(ChatMessage),
    SignalOffer {
        payload: Value,
        sender_handle: Handle,
    },
    SignalAnswer {
        payload: Value,
        sender_handle: Handle,
    },
    SignalCandidate {
        payload: Value,
        sender_handle: Handle,
    },
    PartnerSkipped,
    PartnerReported,
    PartnerDisconnected,
    PartnerLiked {
        from: Participant,
    },
    Error {
        message: String,
    },
}

impl ServerEvent {
    pub fn signal(kind: SignalKind, payload: Value, sender_handle: Handle) -> Self {
        match kind {
            SignalKind::Offer => Self::SignalOffer {
                payload,
                sender_handle,
            },
            SignalKind::Answer => Self::SignalAnswer {
                payload,
                sender_handle,
            },
            SignalKind::Candidate => Self::SignalCandidate {
                payload,
                sender_handle,
            },
        }
    }

    pub fn error(err: &ProtocolError) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn participant(handle: &str) -> Participant {
        Participant {
            handle: Handle::from(handle),
            display_name: "Ada".into(),
            location: "Lisbon".into(),
            joined_at: Utc::now(),
        }
    }

    #[test]
    fn parses_join_with_and_without_profile() {
        let event = parse_client_event(r#"{"type":"join","name":"Ada","location":"Lisbon"}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::Join {
                name: Some("Ada".into()),
                location: Some("Lisbon".into()),
            }
        );

        let event = parse_client_event(r#"{"type":"join"}"#).unwrap();
        assert_eq!(
            event,
            ClientEvent::Join {
                name: None,
                location: None,
            }
        );
    }

    #[test]
    fn parses_unit_events() {
        assert_eq!(
            parse_client_event(r#"{"type":"find-partner"}"#).unwrap(),
            ClientEvent::FindPartner
        );
        assert_eq!(
            parse_client_event(r#"{"type":"skip-partner"}"#).unwrap(),
            ClientEvent::SkipPartner
        );
        assert_eq!(
            parse_client_event(r#"{"type":"like-partner"}"#).unwrap(),
            ClientEvent::LikePartner
        );
        assert_eq!(
            parse_client_event(r#"{"type":"report-partner","reason":"spam"}"#).unwrap(),
            ClientEvent::ReportPartner {
                reason: Some("spam".into())
            }
        );
    }

    #[test]
    fn signal_payload_is_kept_verbatim() {
        let event = parse_client_event(
            r#"{"type":"signal-candidate","target":"peer-2","payload":{"candidate":"a=1","sdpMid":"0"}}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            ClientEvent::SignalCandidate {
                target: Handle::from("peer-2"),
                payload: json!({"candidate": "a=1", "sdpMid": "0"}),
            }
        );
    }

    #[test]
    fn rejects_missing_required_fields() {
        let err = parse_client_event(r#"{"type":"send-message"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(ref m) if m.contains("content")));

        let err = parse_client_event(r#"{"type":"signal-offer","payload":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(ref m) if m.contains("target")));

        let err = parse_client_event(r#"{"type":"signal-answer","target":"p"}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(ref m) if m.contains("payload")));
    }

    #[test]
    fn only_chat_and_signals_are_relayed() {
        let relayed = parse_client_event(r#"{"type":"signal-offer","target":"p","payload":1}"#)
            .unwrap();
        assert!(relayed.is_relayed());
        assert!(ClientEvent::SendMessage { content: "x".into() }.is_relayed());
        assert!(!ClientEvent::FindPartner.is_relayed());
        assert!(!ClientEvent::LikePartner.is_relayed());
    }

    #[test]
    fn rejects_unknown_type_and_garbage() {
        assert!(parse_client_event(r#"{"type":"teleport"}"#).is_err());
        assert!(parse_client_event("not json").is_err());
        assert!(parse_client_event(r#"{"content":"no tag"}"#).is_err());
    }

    #[test]
    fn server_events_use_kebab_case_tags() {
        let json = serde_json::to_value(ServerEvent::PartnerSkipped).unwrap();
        assert_eq!(json, json!({"type": "partner-skipped"}));

        let json = serde_json::to_value(ServerEvent::OnlineCount { count: 4 }).unwrap();
        assert_eq!(json, json!({"type": "online-count", "count": 4}));
    }

    #[test]
    fn partner_found_carries_profile_and_room() {
        let event = ServerEvent::PartnerFound {
            partner: participant("p2"),
            room_id: RoomId::new(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "partner-found");
        assert_eq!(json["partner"]["handle"], "p2");
        assert_eq!(json["partner"]["display_name"], "Ada");
        assert!(json["room_id"].is_string());
        assert!(json["partner"]["joined_at"].is_string());
    }

    #[test]
    fn new_message_flattens_the_chat_record() {
        let event = ServerEvent::NewMessage(ChatMessage {
            id: "m1".into(),
            sender_handle: Handle::from("p1"),
            sender_name: "Ada".into(),
            content: "hi".into(),
            timestamp: Utc::now(),
            kind: MessageKind::Text,
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "new-message");
        assert_eq!(json["content"], "hi");
        assert_eq!(json["sender_handle"], "p1");
        assert_eq!(json["kind"], "text");
    }

    #[test]
    fn signal_constructor_picks_variant() {
        let event = ServerEvent::signal(SignalKind::Answer, json!("sdp"), Handle::from("p1"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            json!({"type": "signal-answer", "payload": "sdp", "sender_handle": "p1"})
        );
    }
}
