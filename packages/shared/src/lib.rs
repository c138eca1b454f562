//! Shared utilities for the Tsumugi workspace.
//!
//! Small building blocks used by both the server crate and its tests:
//! a clock abstraction with UTC millisecond timestamps, and logging setup.

pub mod logger;
pub mod time;
