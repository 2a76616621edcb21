//! Shared test utilities for the MagiTrickle client workspace.
//!
//! [`FakeDaemon`] binds an HTTP server to a temporary Unix socket, records
//! every request it receives, and answers either from a queue of scripted
//! [`Reply`] values or from a small in-memory model of the daemon's
//! groups/rules API.
//!
//! ```toml
//! [dev-dependencies]
//! magitrickle-test-utils = { workspace = true }
//! ```

pub mod daemon;
pub mod tracing_setup;

pub use daemon::{FakeDaemon, RecordedRequest, Reply};
pub use tracing_setup::init_test_tracing;
