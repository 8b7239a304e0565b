//! Hamilton Map Editor
//!
//! Editor for the sector polygons of Hamilton, New Zealand. Sectors are drawn
//! and reshaped on a base map, named, colored and given a visit frequency in
//! the side panel, saved to a durable storage slot and exported as JSON.
//!
//! The browser build exposes `SectorEditor`; the native
//! build ships a command-line front end over the same [`SectorApp`].

pub mod app;
pub mod config;
pub mod constants;
pub mod format;
pub mod geometry;
pub mod handlers;
pub mod map;
pub mod message;
pub mod model;
pub mod panel;
pub mod state;
pub mod storage;

#[cfg(not(target_arch = "wasm32"))]
pub mod cli;

pub use app::{Effect, SectorApp};
pub use config::AppConfig;

// WASM entry point
#[cfg(target_arch = "wasm32")]
pub mod wasm;

#[cfg(target_arch = "wasm32")]
mod wasm_file;

#[cfg(target_arch = "wasm32")]
pub use wasm::*;
