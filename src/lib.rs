// Library target for integration tests and criterion benchmarks.
// The binary entry point is main.rs; this file re-declares the module tree so
// that tests and benches can import types via `dotdash::engine::*` etc.
// Some code is only exercised through the binary, so suppress dead_code warnings.
#![allow(dead_code)]

pub mod audio;
pub mod config;
pub mod engine;
pub mod morse;
pub mod session;
pub mod store;

// Private: binary-side modules, compiled here so their unit tests run with the library
mod app;
mod event;
mod trace_init;
mod ui;
