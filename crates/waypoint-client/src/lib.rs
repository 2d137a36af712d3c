//! Waypoint client library entry.
//!
//! This crate wires the session state, envelope builder, default-request
//! batcher, call dispatcher, and response routing into a cohesive RPC client.
//! Transport, signing, and reauthentication are trait seams so embedders and
//! tests can supply their own implementations.

pub mod auth;
pub mod batch;
pub mod builder;
pub mod cache;
pub mod client;
pub mod config;
pub mod dispatch;
pub mod handlers;
pub mod remote_config;
pub mod route;
pub mod session;
pub mod sign;
pub mod transport;

pub use client::RpcClient;
pub use config::ClientConfig;
pub use session::Session;
