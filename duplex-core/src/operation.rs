//! # Typed Operations
//!
//! Each operation of an interface is a zero-sized marker type implementing
//! [`Operation`]. The marker fixes the operation's name, direction and shape
//! at compile time and knows how to call the matching handler method.
//!
//! Routing is a pure function of the marker: [`HandlerContext::invoke`] reads
//! `Op::DIRECTION` and hands the handler either `next` or `prev`. Whether the
//! handler consumes the call or forwards it is decided inside the handler
//! body, by calling `invoke` again on the routed context.
//!
//! ```rust,ignore
//! pub struct Read;
//!
//! impl Operation<CodecPipeline> for Read {
//!     const NAME: &'static str = "read";
//!     const DIRECTION: Direction = Direction::Forward;
//!     const PARAMETERS: &'static [(&'static str, &'static str)] = &[("msg", "Bytes")];
//!
//!     type Args = Bytes;
//!     type Output = ();
//!     type Error = CodecError;
//!
//!     fn call(handler: &dyn Codec, msg: Bytes, next: &Arc<HandlerContext<CodecPipeline>>) -> Result<(), CodecError> {
//!         handler.read(msg, next)
//!     }
//!
//!     fn absorb(_msg: Bytes) -> Result<(), CodecError> {
//!         Ok(())
//!     }
//! }
//! ```
//!
//! [`HandlerContext::invoke`]: crate::HandlerContext::invoke

use crate::{
    catalogue::OperationDescriptor, context::HandlerContext, direction::Direction,
    error::DispatchError, interface::Interface,
};
use std::sync::Arc;

/// One operation of a pipeline interface.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not an operation of interface `{I}`",
    label = "missing `Operation<{I}>` implementation",
    note = "Operations must fix their name, direction and handler call for the interface `{I}`."
)]
pub trait Operation<I: Interface>: Sized + 'static {
    /// Operation name, unique within the interface.
    const NAME: &'static str;

    /// Which neighbor the handler receives.
    const DIRECTION: Direction;

    /// Ordered `(name, type)` labels of the arguments, for descriptors.
    const PARAMETERS: &'static [(&'static str, &'static str)] = &[];

    /// Arguments passed to the handler, a tuple when there are several.
    type Args;

    /// Value returned to the caller; `()` for void operations.
    type Output: 'static;

    /// Error type shared by the handler and the dispatch layer.
    type Error: From<DispatchError>;

    /// Call the handler method for this operation.
    fn call(
        handler: &I::Handler,
        args: Self::Args,
        routed: &Arc<HandlerContext<I>>,
    ) -> Result<Self::Output, Self::Error>;

    /// Result produced when the call runs off the end of the chain.
    fn absorb(args: Self::Args) -> Result<Self::Output, Self::Error>;

    /// The descriptor derived from this operation.
    fn descriptor() -> OperationDescriptor {
        OperationDescriptor::of::<I, Self>()
    }
}
