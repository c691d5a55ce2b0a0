//! Family star chart: sixty stars, one per child per day.
//!
//! The library holds the core (event store with remote/local fallback,
//! controller, confetti engine); the `tui` feature adds the terminal front-end.

pub mod client;
pub mod color_utils;
pub mod confetti;
pub mod config;
pub mod controller;
pub mod error;
pub mod logging;
pub mod model;
pub mod paths;
pub mod progress;
pub mod storage;
pub mod store;

#[cfg(feature = "tui")]
pub mod tui;

pub use config::{Config, RemoteCredentials};
pub use controller::{Controller, Dialog, Effect, ToggleOutcome};
pub use error::{StoreError, StoreResult};
pub use model::{Backend, Child, ConnectionMode, StarEvent};
pub use store::{EventStore, Served};
