//! Transport adapters for the scenario runner
//!
//! One executor per task variant, the transport traits they are built on,
//! real HTTP and broker clients, and the bounded-time broker consumption
//! protocol.

pub mod broker;
pub mod error;
pub mod executors;
pub mod factory;
pub mod services;
pub mod traits;
pub mod types;

pub use error::{AdapterError, AdapterResult};
pub use executors::all_passed;
pub use factory::TransportFactory;
pub use traits::*;
pub use types::*;
