//! Utility helpers shared across client modules.
//!
//! SYSTEM CONTEXT
//! ==============
//! Utility modules isolate browser/environment concerns from page and session
//! logic to improve reuse and testability.

pub mod browser;
pub mod config;
