mod peer;
mod room;
mod signaling;
mod sync;

pub use peer::PeerId;
pub use room::{RoomCode, RoomCodeError, ROOM_CODE_LEN};
pub use signaling::SignalMessage;
pub use sync::{Fingerprint, SyncMessage};
