mod utils;

mod multi_peer_tests;
mod routing_tests;
