// File: ./src/model/mod.rs
pub mod adapter;
pub mod event;

pub use adapter::NewStarEvent;
pub use event::{Backend, Child, ConnectionMode, StarEvent};
