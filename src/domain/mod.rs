//! Domain Layer
//!
//! Entities, value objects, ports and the translation service. Nothing in
//! here performs I/O directly; all of it goes through the ports.

pub mod edge_objects;
pub mod entities;
pub mod error;
pub mod ports;
pub mod services;
pub mod value_objects;

pub use error::{DriverError, Result};
