mod registry;

pub use registry::{JoinOutcome, PeerSender, RoomRegistry};
