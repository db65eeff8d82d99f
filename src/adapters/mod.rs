//! Adapters Layer
//!
//! Inbound: the agent callback HTTP surface.
//! Outbound: port implementations over REST, SQLite, DashMap and tokio channels.

pub mod inbound;
pub mod outbound;
