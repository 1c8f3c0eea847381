//! HTTP-level integration tests driving the router over in-memory state.

mod file_test;
mod helpers;
mod lifecycle_test;
mod system_test;
