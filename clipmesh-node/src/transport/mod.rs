mod config;
mod connection;
mod event;

pub use config::TransportConfig;
pub use connection::PeerTransport;
pub use event::TransportEvent;
