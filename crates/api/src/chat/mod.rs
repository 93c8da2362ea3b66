//! The chat-platform surface.
//!
//! Outbound calls go through the [`client::ChatClient`] trait; inbound
//! requests are verified by [`signature`] and dispatched on opaque action
//! identifiers parsed by [`actions`]. Block payloads are built in [`views`].

pub mod actions;
pub mod client;
pub mod signature;
pub mod views;
