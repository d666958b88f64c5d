//! Test suite for chatsync
//!
//! This module organizes all tests

pub mod common;
