pub use clipmesh_core::PeerId;

pub mod model {
    pub use clipmesh_core::model::*;
}

#[cfg(feature = "relay")]
pub mod relay {
    pub use clipmesh_relay::*;
}

#[cfg(feature = "node")]
pub mod node {
    pub use clipmesh_node::*;
}
