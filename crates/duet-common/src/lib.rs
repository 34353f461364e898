pub mod errors;
pub mod events;
pub mod id;

pub use errors::{ConfigError, DuetError, PairingError, ProtocolError};
pub use events::{Event, EventBus};
pub use id::{new_id, Handle, RoomId};

pub type Result<T> = std::result::Result<T, DuetError>;
