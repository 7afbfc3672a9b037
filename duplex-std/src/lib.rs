//! # duplex-std
//!
//! Standard implementations for the duplex pipeline framework.
//!
//! This crate provides:
//! - **Binding strategies**: [`NamedBinding`](bindings::NamedBinding) over a
//!   [`HandlerRegistry`](bindings::HandlerRegistry),
//!   [`SwappableBinding`](bindings::SwappableBinding),
//!   [`TracedBinding`](bindings::TracedBinding)
//! - **Testing utilities**: a ready-made [`Probe`](testing::Probe) interface
//!   with recording handlers

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use duplex_core;

// Modules
pub mod bindings;
pub mod testing;
