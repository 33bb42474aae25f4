//! Language-model capability: client, throttling, retries.

pub mod client;
pub mod retry;
pub mod throttle;
