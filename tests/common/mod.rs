//! Common test utilities and helpers
//!
//! This module provides shared utilities for all tests including:
//! - In-memory fakes of the directory and the realtime channel
//! - An in-process WebSocket server
//! - Fixtures for wire types
//! - A polling helper for asynchronous state

pub mod assertions;
pub mod fixtures;
pub mod ws_server;

// Re-export commonly used utilities
pub use fakes::*;
pub use fixtures::*;
pub use ws_server::*;
