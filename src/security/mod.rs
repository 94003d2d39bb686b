//! Security module for admission control.
//!
//! Commands reach the execution engine only after their base command has
//! been checked against the administrator's allowlist.

mod allowlist;

pub use allowlist::{ALLOW_ALL, AllowlistPolicy, base_command};
