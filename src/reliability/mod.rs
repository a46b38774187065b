//! Reliability primitives for remote calls.

pub mod retry;

pub use retry::{RetryConfig, retry_remote, retry_remote_when};
