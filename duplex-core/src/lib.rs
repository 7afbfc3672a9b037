//! # duplex-core
//!
//! Core traits and the chain runtime for the duplex pipeline framework.
//!
//! This crate has minimal dependencies and is meant to be imported by code
//! that declares pipeline interfaces or writes handlers without needing the
//! extra binding strategies of `duplex-std`.
//!
//! # Building Blocks
//!
//! ## Descriptor Model ([`Catalogue`])
//!
//! Describes an interface's operations: name, ordered parameters, return
//! type and [`Direction`]. The runtime is parametrized over this data.
//!
//! ## Interface & Operations ([`Interface`], [`Operation`])
//!
//! The user declares a handler trait and one marker type per operation. The
//! marker fixes the direction at compile time and knows how to call the
//! handler method.
//!
//! ## Chain Node ([`HandlerContext`])
//!
//! One position in the chain. Wraps a handler through a [`HandlerBinding`]
//! and routes each operation to `next` (forward) or `prev` (reverse).
//!
//! ## Owner ([`Pipeline`])
//!
//! Holds the head and tail sentinels plus the handler contexts between them,
//! applies structural mutations, and exposes [`Pipeline::fire`] as the entry
//! point for every operation.
//!
//! # Error Types
//!
//! - [`DuplexError`] - Top-level error type
//! - [`DispatchError`] - Routing failures
//! - [`CatalogueError`] - Invalid catalogues
//! - [`PipelineError`] - Rejected mutations

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod binding;
mod catalogue;
mod context;
mod direction;
mod error;
mod interface;
mod operation;
mod pipeline;

// Re-exports
pub use binding::{FixedBinding, HandlerBinding};
pub use catalogue::{Catalogue, CatalogueBuilder, OperationDescriptor, Parameter, ReturnType};
pub use context::{ContextKind, HandlerContext};
pub use direction::Direction;
pub use error::{BoxError, CatalogueError, DispatchError, DuplexError, PipelineError};
pub use interface::Interface;
pub use operation::Operation;
pub use pipeline::{HEAD, Pipeline, PipelineBuilder, Position, TAIL, Walk};
