mod service;
mod ws_handler;

pub use service::RelayService;
pub use ws_handler::ws_handler;
