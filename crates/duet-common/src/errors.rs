use std::path::PathBuf;

use crate::id::Handle;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("config parse error: {0}")]
    ParseError(String),

    #[error("config validation error: {0}")]
    ValidationError(String),
}

/// Broken pairing invariants. These point at a caller bug, so the operation
/// is rejected and shared state is left untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PairingError {
    #[error("participant {0} is already in a room")]
    AlreadyPaired(Handle),

    #[error("participant {0} cannot be paired with itself")]
    SelfPairing(Handle),
}

/// Inbound frames that fail validation at the connection boundary.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("malformed event: {0}")]
    Malformed(String),

    #[error("join is required before any other event")]
    NotJoined,

    #[error("message too long: {len} characters (max {max})")]
    MessageTooLong { len: usize, max: usize },

    #[error("relaying too fast, slow down")]
    RateLimited,
}

#[derive(Debug, thiserror::Error)]
pub enum DuetError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = ConfigError::FileNotFound(PathBuf::from("/tmp/missing.toml"));
        assert_eq!(err.to_string(), "config file not found: /tmp/missing.toml");

        let err = ConfigError::ParseError("unexpected token".into());
        assert_eq!(err.to_string(), "config parse error: unexpected token");

        let err = ConfigError::ValidationError("server.port = 80 is out of range".into());
        assert_eq!(
            err.to_string(),
            "config validation error: server.port = 80 is out of range"
        );
    }

    #[test]
    fn pairing_error_names_the_handle() {
        let handle = Handle::from("abc");
        let err = PairingError::AlreadyPaired(handle.clone());
        assert_eq!(err.to_string(), "participant abc is already in a room");

        let err = PairingError::SelfPairing(handle);
        assert_eq!(err.to_string(), "participant abc cannot be paired with itself");
    }

    #[test]
    fn protocol_error_display() {
        let err = ProtocolError::Malformed("missing field `content`".into());
        assert_eq!(err.to_string(), "malformed event: missing field `content`");

        let err = ProtocolError::MessageTooLong { len: 12, max: 10 };
        assert_eq!(err.to_string(), "message too long: 12 characters (max 10)");

        assert_eq!(
            ProtocolError::NotJoined.to_string(),
            "join is required before any other event"
        );
        assert_eq!(
            ProtocolError::RateLimited.to_string(),
            "relaying too fast, slow down"
        );
    }

    #[test]
    fn duet_error_from_config() {
        let config_err = ConfigError::ParseError("bad toml".into());
        let err: DuetError = config_err.into();
        assert!(matches!(err, DuetError::Config(_)));
        assert!(err.to_string().contains("bad toml"));
    }

    #[test]
    fn duet_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::AddrInUse, "port taken");
        let err: DuetError = io_err.into();
        assert!(matches!(err, DuetError::Io(_)));
        assert!(err.to_string().contains("port taken"));
    }
}
