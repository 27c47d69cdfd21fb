//! Test infrastructure for ONTAP configuration managers
//!
//! Provides:
//! - A scripted in-memory ZAPI endpoint ([`MockSession`])
//! - Response fixtures for common ZAPI shapes
//! - Failure injection (API errors, transport errors, canned responses)
//! - Invocation verification helpers

pub mod fixtures;
mod verification;

pub use fixtures::*;
pub use verification::*;
