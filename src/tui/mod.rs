// File: ./src/tui/mod.rs
pub mod action;
pub mod input;
pub mod sprites;
pub mod state;
pub mod view;
