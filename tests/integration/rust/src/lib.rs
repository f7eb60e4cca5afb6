//! SFS wire compatibility tests.
//!
//! These tests verify that the Rust codec decodes frames captured from a
//! SmartFoxServer-style peer and produces the byte layout such peers expect.

pub mod interop;

#[cfg(test)]
mod interop_test;

#[cfg(test)]
mod property_test;

pub use interop::*;
