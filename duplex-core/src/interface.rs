//! # Pipeline Interface
//!
//! An [`Interface`] ties together the three things a pipeline is parametrized
//! over: the handler trait every context wraps, a name used in diagnostics,
//! and the operation catalogue.
//!
//! The implementing type is usually an empty marker struct:
//!
//! ```rust,ignore
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
//! ```

use crate::{catalogue::Catalogue, error::CatalogueError};

/// A user-declared pipeline interface.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a pipeline interface",
    label = "missing `Interface` implementation",
    note = "Declare the handler type and the operation catalogue with `impl Interface for {Self}`."
)]
pub trait Interface: Sized + Send + Sync + 'static {
    /// The handler type wrapped by every context, typically `dyn UserTrait`.
    type Handler: ?Sized + Send + Sync + 'static;

    /// Name used in errors and log fields.
    const NAME: &'static str;

    /// The operations this interface exposes.
    fn catalogue() -> Result<Catalogue, CatalogueError>;
}
