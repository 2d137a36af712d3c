//! Top-level facade crate for waypoint.
//!
//! Re-exports the proto types and the client library so users can depend on a
//! single crate.

pub mod proto {
    pub use waypoint_proto::*;
}

pub mod client {
    pub use waypoint_client::*;
}
