//! # duplex - Bidirectional Handler Pipelines
//!
//! `duplex` builds chains of handlers that operations travel through in
//! both directions. Forward operations enter at the head and are handed the
//! `next` context; reverse operations enter at the tail and are handed
//! `prev`. Each handler decides whether to pass a call on or finish it.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use duplex::prelude::*;
//!
//! pub trait Codec: Send + Sync {
//!     fn read(&self, msg: Bytes, next: &Arc<HandlerContext<CodecPipeline>>) -> Result<(), CodecError>;
//!     fn write(&self, msg: Bytes, prev: &Arc<HandlerContext<CodecPipeline>>) -> Result<usize, CodecError>;
//! }
//!
//! pub struct CodecPipeline;
//!
//! impl Interface for CodecPipeline {
//!     type Handler = dyn Codec;
//!     const NAME: &'static str = "codec";
//!
//!     fn catalogue() -> Result<Catalogue, CatalogueError> {
//!         Catalogue::builder()
//!             .operation::<Self, Read>()
//!             .operation::<Self, Write>()
//!             .build()
//!     }
//! }
//!
//! let pipeline = Pipeline::<CodecPipeline>::builder()
//!     .handler("framer", Arc::new(Framer::default()))
//!     .handler("logger", Arc::new(Logger))
//!     .build()?;
//!
//! pipeline.fire::<Read>(incoming)?;
//! let written = pipeline.fire::<Write>(outgoing)?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use duplex_core::{
    // Errors
    BoxError,
    // Descriptor model
    Catalogue,
    CatalogueBuilder,
    CatalogueError,
    // Chain runtime
    ContextKind,
    Direction,
    DispatchError,
    DuplexError,
    // Bindings
    FixedBinding,
    HEAD,
    HandlerBinding,
    HandlerContext,
    Interface,
    Operation,
    OperationDescriptor,
    Parameter,
    Pipeline,
    PipelineBuilder,
    PipelineError,
    Position,
    ReturnType,
    TAIL,
    Walk,
};

/// Binding strategies.
pub mod bindings {
    pub use duplex_core::FixedBinding;
    pub use duplex_std::bindings::{HandlerRegistry, NamedBinding, SwappableBinding, TracedBinding};
}

/// Testing utilities.
pub mod testing {
    #![allow(clippy::wildcard_imports)]
    pub use duplex_std::testing::*;
}

/// Prelude module - common imports for duplex.
///
/// # Usage
///
/// ```rust,ignore
/// use duplex::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        Catalogue, CatalogueError, Direction, DispatchError, HandlerBinding, HandlerContext,
        Interface, Operation, Pipeline, PipelineError, Position,
    };
    pub use std::sync::Arc;
}
