//! Error types for duplex.
//!
//! This module provides a structured error hierarchy using `thiserror`:
//!
//! - [`DuplexError`] - Top-level error type
//! - [`DispatchError`] - Structural failures while routing an operation
//! - [`CatalogueError`] - Invalid operation catalogues
//! - [`PipelineError`] - Rejected structural mutations
//!
//! Errors raised by handler code are not represented here. They belong to
//! each operation's own error type and travel back to the caller untouched.

use crate::direction::Direction;
use thiserror::Error;

/// A boxed error type for dynamic error handling.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Top-level error type for all duplex operations.
#[derive(Error, Debug)]
pub enum DuplexError {
    /// An operation could not be routed.
    #[error("dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// A pipeline mutation was rejected.
    #[error("pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// The operation catalogue is invalid.
    #[error("catalogue error: {0}")]
    Catalogue(#[from] CatalogueError),

    /// A custom error occurred.
    #[error(transparent)]
    Custom(BoxError),
}

/// Structural failures detected while dispatching an operation.
///
/// All variants are fatal to the dispatch call that raised them. Nothing in
/// the chain retries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The context's binding produced no handler.
    #[error("no handler resolved for context `{context}`")]
    UnresolvedHandler {
        /// Name of the context.
        context: String,
    },

    /// A neighbor link is missing or dangling where the chain must continue.
    #[error("context `{context}` has no {direction} neighbor")]
    BrokenChain {
        /// Name of the context whose link is broken.
        context: String,
        /// Direction of the missing link.
        direction: Direction,
    },

    /// The context outlived the pipeline that owned it.
    #[error("context `{context}` is detached from its pipeline")]
    Detached {
        /// Name of the context.
        context: String,
    },

    /// The operation is not part of the interface's catalogue.
    #[error("operation `{operation}` is not declared by interface `{interface}`")]
    UndeclaredOperation {
        /// Operation name.
        operation: &'static str,
        /// Interface name.
        interface: &'static str,
    },

    /// The catalogue declares the operation with the other direction.
    #[error("operation `{operation}` is declared {declared} but dispatched {dispatched}")]
    DirectionMismatch {
        /// Operation name.
        operation: &'static str,
        /// Direction recorded in the catalogue.
        declared: Direction,
        /// Direction of the typed operation.
        dispatched: Direction,
    },

    /// The catalogue declares different parameters or return shape.
    #[error("operation `{operation}` is declared as `{declared}` but dispatched as `{dispatched}`")]
    ShapeMismatch {
        /// Operation name.
        operation: &'static str,
        /// Signature recorded in the catalogue.
        declared: String,
        /// Signature of the typed operation.
        dispatched: String,
    },
}

/// Errors raised while building an operation catalogue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogueError {
    /// No operations were declared.
    #[error("operation catalogue is empty")]
    Empty,

    /// Two operations share a name.
    #[error("operation `{0}` is declared more than once")]
    Duplicate(String),
}

/// Errors raised by pipeline construction and structural mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// The catalogue supplied for the pipeline is invalid.
    #[error(transparent)]
    Catalogue(#[from] CatalogueError),

    /// A context with this name already exists (or the name is reserved).
    #[error("context name `{0}` is already in use")]
    DuplicateName(String),

    /// No context with this name exists.
    #[error("no context named `{0}`")]
    NotFound(String),

    /// The anchor is a sentinel on the side where nothing can be inserted.
    #[error("cannot insert outside sentinel `{0}`")]
    SentinelAnchor(String),
}
