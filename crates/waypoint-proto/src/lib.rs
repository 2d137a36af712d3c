//! Waypoint proto: transport-agnostic protocol primitives and error types.
//!
//! This crate defines the wire-level envelope format, the request-type tag
//! space, the typed message bodies carried inside payloads, and the error
//! surface shared by the client crate. It intentionally carries no transport
//! or runtime dependencies so it can be reused in multiple contexts.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here
//! (`#![deny(clippy::panic, clippy::unwrap_used, clippy::expect_used)]`).
//! All fallible paths must surface as `RpcError`/`Result` so a client process
//! does not crash on a malformed server response.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod envelope;
pub mod error;
pub mod messages;
pub mod request;

/// Shared result type.
pub use error::{Result, RpcError};
