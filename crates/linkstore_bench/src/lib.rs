//! Benchmarks for LinkStore.
//!
//! Run with `cargo bench -p linkstore_bench`.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod utils;
