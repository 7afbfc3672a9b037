//! # Chain Node (HandlerContext)
//!
//! A [`HandlerContext`] is one position in a pipeline's doubly-linked chain.
//! It wraps exactly one handler binding and implements every operation of the
//! interface through [`HandlerContext::invoke`].
//!
//! # Routing
//!
//! For an operation `Op`, a context resolves its handler and calls it with the
//! neighbor that matches `Op::DIRECTION`:
//!
//! | context  | forward op                    | reverse op                    |
//! |----------|-------------------------------|-------------------------------|
//! | handler  | `handler.op(args, next)`      | `handler.op(args, prev)`      |
//! | head     | passes through to `next`      | absorbed (end of chain)       |
//! | tail     | absorbed (end of chain)       | passes through to `prev`      |
//!
//! Contexts look exactly one hop away. Skipping neighbors that are not
//! interested in an operation is the handler's business.
//!
//! # Links
//!
//! `prev` and `next` are weak references published through [`ArcSwap`]:
//! readers never take a lock and always observe a complete reference. Only
//! the owning [`Pipeline`] writes them, under its mutation lock.

use crate::{
    binding::HandlerBinding,
    catalogue::{Catalogue, OperationDescriptor},
    direction::Direction,
    error::DispatchError,
    interface::Interface,
    operation::Operation,
    pipeline::Pipeline,
};
use arc_swap::ArcSwap;
use std::{
    any::TypeId,
    fmt,
    sync::{Arc, Weak},
};

/// Role of a context within its chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextKind {
    /// Start sentinel; forward operations enter here.
    Head,
    /// End sentinel; reverse operations enter here.
    Tail,
    /// A context wrapping a user handler.
    Handler,
}

impl ContextKind {
    /// Whether this kind is a sentinel.
    pub const fn is_sentinel(self) -> bool {
        !matches!(self, ContextKind::Handler)
    }

    /// Whether an operation travelling in `direction` ends at this context.
    pub const fn terminates(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (ContextKind::Head, Direction::Reverse) | (ContextKind::Tail, Direction::Forward)
        )
    }
}

/// One link in a pipeline's chain.
pub struct HandlerContext<I: Interface> {
    name: String,
    kind: ContextKind,
    pipeline: Weak<Pipeline<I>>,
    catalogue: Arc<Catalogue>,
    binding: Box<dyn HandlerBinding<I::Handler>>,
    prev: ArcSwap<Weak<HandlerContext<I>>>,
    next: ArcSwap<Weak<HandlerContext<I>>>,
}

impl<I: Interface> HandlerContext<I> {
    pub(crate) fn new(
        name: String,
        kind: ContextKind,
        pipeline: Weak<Pipeline<I>>,
        catalogue: Arc<Catalogue>,
        binding: Box<dyn HandlerBinding<I::Handler>>,
    ) -> Self {
        Self {
            name,
            kind,
            pipeline,
            catalogue,
            binding,
            prev: ArcSwap::from_pointee(Weak::new()),
            next: ArcSwap::from_pointee(Weak::new()),
        }
    }

    /// Name of this context, unique within its pipeline.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Role of this context.
    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// Whether this is the head or tail sentinel.
    pub fn is_sentinel(&self) -> bool {
        self.kind.is_sentinel()
    }

    /// The binding strategy of this context.
    pub fn binding(&self) -> &dyn HandlerBinding<I::Handler> {
        &*self.binding
    }

    /// Resolve the wrapped handler.
    ///
    /// Fails with [`DispatchError::UnresolvedHandler`] when the binding has
    /// nothing to offer, which is always the case for sentinels.
    pub fn handler(&self) -> Result<Arc<I::Handler>, DispatchError> {
        self.binding
            .resolve()
            .ok_or_else(|| DispatchError::UnresolvedHandler {
                context: self.name.clone(),
            })
    }

    /// The pipeline that owns this context.
    ///
    /// Every call, on every context of the same chain, returns the same `Arc`.
    pub fn pipeline(&self) -> Result<Arc<Pipeline<I>>, DispatchError> {
        self.pipeline.upgrade().ok_or_else(|| DispatchError::Detached {
            context: self.name.clone(),
        })
    }

    /// The context one hop toward the tail.
    pub fn find_next_ctx(&self) -> Option<Arc<Self>> {
        follow(&self.next)
    }

    /// The context one hop toward the head.
    pub fn find_prev_ctx(&self) -> Option<Arc<Self>> {
        follow(&self.prev)
    }

    /// The neighbor an operation of `direction` is routed to.
    pub fn neighbor(&self, direction: Direction) -> Option<Arc<Self>> {
        match direction {
            Direction::Forward => self.find_next_ctx(),
            Direction::Reverse => self.find_prev_ctx(),
        }
    }

    /// Dispatch `Op` at this context.
    ///
    /// A handler context calls its handler with the routed neighbor and
    /// returns whatever the handler returns. A sentinel passes the call on,
    /// or absorbs it with [`Operation::absorb`] when it sits at the end the
    /// operation travels toward.
    pub fn invoke<Op>(&self, args: Op::Args) -> Result<Op::Output, Op::Error>
    where
        Op: Operation<I>,
    {
        self.check_declared::<Op>()?;

        if self.kind.terminates(Op::DIRECTION) {
            #[cfg(feature = "tracing")]
            tracing::trace!(
                context = %self.name,
                operation = Op::NAME,
                direction = %Op::DIRECTION,
                "operation absorbed at chain end"
            );
            return Op::absorb(args);
        }

        let routed = self.neighbor(Op::DIRECTION).ok_or_else(|| DispatchError::BrokenChain {
            context: self.name.clone(),
            direction: Op::DIRECTION,
        })?;

        if self.kind.is_sentinel() {
            return routed.invoke::<Op>(args);
        }

        let handler = self.handler()?;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            interface = I::NAME,
            context = %self.name,
            operation = Op::NAME,
            direction = %Op::DIRECTION,
            routed = %routed.name,
            "dispatching operation"
        );

        Op::call(&handler, args, &routed)
    }

    fn check_declared<Op>(&self) -> Result<(), DispatchError>
    where
        Op: Operation<I>,
    {
        match self.catalogue.get(Op::NAME) {
            None => Err(DispatchError::UndeclaredOperation {
                operation: Op::NAME,
                interface: I::NAME,
            }),
            Some(declared) if declared.direction() != Op::DIRECTION => {
                Err(DispatchError::DirectionMismatch {
                    operation: Op::NAME,
                    declared: declared.direction(),
                    dispatched: Op::DIRECTION,
                })
            }
            Some(declared) if !same_shape::<I, Op>(declared) => {
                Err(DispatchError::ShapeMismatch {
                    operation: Op::NAME,
                    declared: declared.to_string(),
                    dispatched: Op::descriptor().to_string(),
                })
            }
            Some(_) => Ok(()),
        }
    }

    pub(crate) fn link_next(&self, next: &Arc<Self>) {
        self.next.store(Arc::new(Arc::downgrade(next)));
    }

    pub(crate) fn link_prev(&self, prev: &Arc<Self>) {
        self.prev.store(Arc::new(Arc::downgrade(prev)));
    }
}

/// Parameter names and voidness must agree; type labels are free-form.
fn same_shape<I, Op>(declared: &OperationDescriptor) -> bool
where
    I: Interface,
    Op: Operation<I>,
{
    let void = TypeId::of::<Op::Output>() == TypeId::of::<()>();
    declared.return_type().is_void() == void
        && declared.parameters().len() == Op::PARAMETERS.len()
        && declared
            .parameters()
            .iter()
            .zip(Op::PARAMETERS)
            .all(|(param, &(name, _))| param.name() == name)
}

/// Upgrade a link, rereading it when the target is already gone.
///
/// A context is only dropped after its neighbors were rewired, so a dead
/// target on a link that has since changed means the fresh value is valid.
fn follow<T>(link: &ArcSwap<Weak<T>>) -> Option<Arc<T>> {
    loop {
        let current = link.load_full();
        if let Some(target) = current.upgrade() {
            return Some(target);
        }
        if Arc::ptr_eq(&current, &*link.load()) {
            return None;
        }
    }
}

impl<I: Interface> fmt::Debug for HandlerContext<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerContext")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("binding", &self.binding.describe())
            .finish_non_exhaustive()
    }
}
