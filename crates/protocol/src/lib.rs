//! Wire types for the WebDriver hub protocol.
//!
//! This crate contains the serde-serializable types used on the hub's
//! protocol surface and at its collaborator boundaries. These types
//! represent the "protocol layer" - the shapes of data as they appear
//! on the wire.
//!
//! # Design Philosophy
//!
//! Types in this crate are:
//! - **Pure data**: No behavior beyond serialization/deserialization
//! - **1:1 with the wire**: Match the W3C-style payloads clients send
//! - **Stable**: Changes only when the wire protocol changes
//!
//! Negotiation, routing, and forwarding logic live in `simhub-proxy`.

pub mod capabilities;
pub mod errors;

pub use capabilities::*;
pub use errors::*;
