//! Utility modules for common functionality.
//!
//! This module contains helpers used throughout the server, currently the
//! logging configuration.

pub mod logger;
