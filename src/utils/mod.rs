//! Utility functions and helpers for the k8cache proxy.
//!
//! # Submodules
//!
//! - `logging`: Tracing initialization and credential redaction.
//!
//! Author: kelexine (<https://github.com/kelexine>)

pub mod logging;
