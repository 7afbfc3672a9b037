//! Binding strategies beyond [`FixedBinding`](duplex_core::FixedBinding).
//!
//! - [`NamedBinding`] - resolves a handler by name at dispatch time
//! - [`SwappableBinding`] - a slot that can be refilled or emptied while the
//!   pipeline runs
//! - [`TracedBinding`] - wraps another binding and reports resolution misses

mod named;
mod swappable;
mod traced;

pub use named::{HandlerRegistry, NamedBinding};
pub use swappable::SwappableBinding;
pub use traced::TracedBinding;
