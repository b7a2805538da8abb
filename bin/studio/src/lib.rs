//! Headless studio for appcanvas.
//!
//! Runs an app definition through the live preview without a browser:
//! scripted taps and inputs go through the interaction dispatcher, the
//! resulting trace is exported to disk, and progress can be broadcast to a
//! collaboration room.

pub mod api;
pub mod config;
pub mod error;
pub mod presenter;
pub mod runner;
pub mod script;

pub use runner::{RunSummary, WorkflowSummary, run};
