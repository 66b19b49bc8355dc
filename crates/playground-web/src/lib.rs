#![forbid(unsafe_code)]

//! Browser shell for the live playground.
//!
//! [`Playground`] is a `wasm-bindgen`-exported struct that owns a
//! [`playground_core::Session`] and a sandboxed `<iframe>` host. The page
//! supplies the editor widget and the buttons; it calls `run`, `editActive`,
//! `applyTemplate` and friends, and renders the JSON panels it gets back.

pub mod runner_core;

pub use runner_core::{RunSummary, RunnerCore};

#[cfg(target_arch = "wasm32")]
mod frame_host;
#[cfg(target_arch = "wasm32")]
mod logging;
#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::Playground;
