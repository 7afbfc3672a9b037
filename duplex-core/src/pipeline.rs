//! # Pipeline (chain owner)
//!
//! A [`Pipeline`] owns the chain `head ↔ ctx₁ ↔ … ↔ ctxₙ ↔ tail` and exposes
//! the interface's operations as entry points: [`Pipeline::fire`] enters at
//! the head for forward operations and at the tail for reverse ones.
//!
//! # Ownership
//!
//! - The pipeline holds the only strong references to its contexts: the two
//!   sentinels plus a copy-on-write snapshot of the handler contexts.
//! - Contexts hold weak references to their neighbors and to the pipeline,
//!   so dropping the pipeline drops the whole chain.
//!
//! # Mutation
//!
//! Structural changes are serialized by a mutation lock. A new context has
//! both of its own links set before either neighbor points at it. A removed
//! context keeps its links, so a dispatch already running through it
//! completes against the neighbors it had. Every committed change bumps
//! [`Pipeline::epoch`].

use crate::{
    binding::{FixedBinding, HandlerBinding, SentinelBinding},
    catalogue::Catalogue,
    context::{ContextKind, HandlerContext},
    direction::Direction,
    error::PipelineError,
    interface::Interface,
    operation::Operation,
};
use arc_swap::ArcSwap;
use parking_lot::Mutex;
use std::{
    fmt,
    sync::{
        Arc, Weak,
        atomic::{AtomicU64, Ordering},
    },
};

/// Reserved name of the head sentinel.
pub const HEAD: &str = "head";

/// Reserved name of the tail sentinel.
pub const TAIL: &str = "tail";

/// Where [`Pipeline::insert`] places a new context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position<'a> {
    /// Right after the head sentinel.
    First,
    /// Right before the tail sentinel.
    Last,
    /// Immediately before the named context (`tail` is allowed).
    Before(&'a str),
    /// Immediately after the named context (`head` is allowed).
    After(&'a str),
}

#[derive(Clone, Copy, Debug)]
enum Mutation {
    Add,
    Remove,
    Replace,
}

impl Mutation {
    #[cfg_attr(not(feature = "tracing"), allow(dead_code))]
    fn as_str(self) -> &'static str {
        match self {
            Mutation::Add => "add",
            Mutation::Remove => "remove",
            Mutation::Replace => "replace",
        }
    }
}

/// Owner of a chain of handler contexts.
pub struct Pipeline<I: Interface> {
    name: String,
    catalogue: Arc<Catalogue>,
    head: Arc<HandlerContext<I>>,
    tail: Arc<HandlerContext<I>>,
    contexts: ArcSwap<Vec<Arc<HandlerContext<I>>>>,
    mutation: Mutex<()>,
    epoch: AtomicU64,
    self_ref: Weak<Pipeline<I>>,
}

impl<I: Interface> Pipeline<I> {
    /// Create an empty pipeline with the interface's own catalogue.
    pub fn new() -> Result<Arc<Self>, PipelineError> {
        Self::builder().build()
    }

    /// Start configuring a pipeline.
    pub fn builder() -> PipelineBuilder<I> {
        PipelineBuilder::new()
    }

    fn with_catalogue(name: String, catalogue: Catalogue) -> Arc<Self> {
        let catalogue = Arc::new(catalogue);

        Arc::new_cyclic(|this| {
            let head = Arc::new(HandlerContext::new(
                HEAD.to_string(),
                ContextKind::Head,
                this.clone(),
                Arc::clone(&catalogue),
                Box::new(SentinelBinding),
            ));
            let tail = Arc::new(HandlerContext::new(
                TAIL.to_string(),
                ContextKind::Tail,
                this.clone(),
                Arc::clone(&catalogue),
                Box::new(SentinelBinding),
            ));
            head.link_next(&tail);
            tail.link_prev(&head);

            Self {
                name,
                catalogue,
                head,
                tail,
                contexts: ArcSwap::from_pointee(Vec::new()),
                mutation: Mutex::new(()),
                epoch: AtomicU64::new(0),
                self_ref: this.clone(),
            }
        })
    }

    // ------------------------------------------------------------------
    // Operation surface
    // ------------------------------------------------------------------

    /// Dispatch `Op` from the end of the chain its direction starts at.
    pub fn fire<Op>(&self, args: Op::Args) -> Result<Op::Output, Op::Error>
    where
        Op: Operation<I>,
    {
        self.entry(Op::DIRECTION).invoke::<Op>(args)
    }

    /// The sentinel an operation of `direction` enters through.
    pub fn entry(&self, direction: Direction) -> &Arc<HandlerContext<I>> {
        match direction {
            Direction::Forward => &self.head,
            Direction::Reverse => &self.tail,
        }
    }

    // ------------------------------------------------------------------
    // Structural mutation
    // ------------------------------------------------------------------

    /// Insert a handler right after the head.
    pub fn add_first(
        &self,
        name: impl Into<String>,
        handler: Arc<I::Handler>,
    ) -> Result<Arc<HandlerContext<I>>, PipelineError> {
        self.insert(Position::First, name, FixedBinding::new(handler))
    }

    /// Insert a handler right before the tail.
    pub fn add_last(
        &self,
        name: impl Into<String>,
        handler: Arc<I::Handler>,
    ) -> Result<Arc<HandlerContext<I>>, PipelineError> {
        self.insert(Position::Last, name, FixedBinding::new(handler))
    }

    /// Insert a handler immediately before `anchor`.
    pub fn add_before(
        &self,
        anchor: &str,
        name: impl Into<String>,
        handler: Arc<I::Handler>,
    ) -> Result<Arc<HandlerContext<I>>, PipelineError> {
        self.insert(Position::Before(anchor), name, FixedBinding::new(handler))
    }

    /// Insert a handler immediately after `anchor`.
    pub fn add_after(
        &self,
        anchor: &str,
        name: impl Into<String>,
        handler: Arc<I::Handler>,
    ) -> Result<Arc<HandlerContext<I>>, PipelineError> {
        self.insert(Position::After(anchor), name, FixedBinding::new(handler))
    }

    /// Insert a context with any binding strategy.
    pub fn insert<B>(
        &self,
        position: Position<'_>,
        name: impl Into<String>,
        binding: B,
    ) -> Result<Arc<HandlerContext<I>>, PipelineError>
    where
        B: HandlerBinding<I::Handler>,
    {
        self.insert_boxed(position, name.into(), Box::new(binding))
    }

    fn insert_boxed(
        &self,
        position: Position<'_>,
        name: String,
        binding: Box<dyn HandlerBinding<I::Handler>>,
    ) -> Result<Arc<HandlerContext<I>>, PipelineError> {
        let _guard = self.mutation.lock();
        let current = self.contexts.load_full();

        if name == HEAD || name == TAIL || position_of(&current, &name).is_some() {
            return Err(PipelineError::DuplicateName(name));
        }

        let index = insertion_index(&current, position)?;
        let prev = self.before_index(&current, index);
        let next = self.at_or_tail(&current, index);

        let ctx = Arc::new(self.new_context(name, binding));
        self.splice(&prev, &ctx, &next);

        let mut chain = Vec::with_capacity(current.len() + 1);
        chain.extend(current.iter().cloned());
        chain.insert(index, Arc::clone(&ctx));
        self.commit(chain, Mutation::Add, &ctx);

        Ok(ctx)
    }

    /// Unlink the named context and return it.
    ///
    /// The removed context keeps its own links; only its neighbors are
    /// rewired to point at each other.
    pub fn remove(&self, name: &str) -> Result<Arc<HandlerContext<I>>, PipelineError> {
        let _guard = self.mutation.lock();
        let current = self.contexts.load_full();

        let index =
            position_of(&current, name).ok_or_else(|| PipelineError::NotFound(name.to_string()))?;
        let prev = self.before_index(&current, index);
        let next = self.at_or_tail(&current, index + 1);

        prev.link_next(&next);
        next.link_prev(&prev);

        let mut chain: Vec<_> = current.iter().cloned().collect();
        let removed = chain.remove(index);
        self.commit(chain, Mutation::Remove, &removed);

        Ok(removed)
    }

    /// Swap the handler at `name` for a new one, keeping the position.
    ///
    /// Returns the context that was replaced.
    pub fn replace(
        &self,
        name: &str,
        handler: Arc<I::Handler>,
    ) -> Result<Arc<HandlerContext<I>>, PipelineError> {
        self.replace_binding(name, FixedBinding::new(handler))
    }

    /// Swap the binding at `name` for a new one, keeping the position.
    pub fn replace_binding<B>(
        &self,
        name: &str,
        binding: B,
    ) -> Result<Arc<HandlerContext<I>>, PipelineError>
    where
        B: HandlerBinding<I::Handler>,
    {
        let _guard = self.mutation.lock();
        let current = self.contexts.load_full();

        let index =
            position_of(&current, name).ok_or_else(|| PipelineError::NotFound(name.to_string()))?;
        let prev = self.before_index(&current, index);
        let next = self.at_or_tail(&current, index + 1);

        let ctx = Arc::new(self.new_context(name.to_string(), Box::new(binding)));
        self.splice(&prev, &ctx, &next);

        let mut chain: Vec<_> = current.iter().cloned().collect();
        let replaced = std::mem::replace(&mut chain[index], Arc::clone(&ctx));
        self.commit(chain, Mutation::Replace, &ctx);

        Ok(replaced)
    }

    fn new_context(
        &self,
        name: String,
        binding: Box<dyn HandlerBinding<I::Handler>>,
    ) -> HandlerContext<I> {
        HandlerContext::new(
            name,
            ContextKind::Handler,
            self.self_ref.clone(),
            Arc::clone(&self.catalogue),
            binding,
        )
    }

    /// Link `ctx` between `prev` and `next`, publishing its own links first.
    fn splice(
        &self,
        prev: &Arc<HandlerContext<I>>,
        ctx: &Arc<HandlerContext<I>>,
        next: &Arc<HandlerContext<I>>,
    ) {
        ctx.link_prev(prev);
        ctx.link_next(next);
        next.link_prev(ctx);
        prev.link_next(ctx);
    }

    fn before_index(
        &self,
        chain: &[Arc<HandlerContext<I>>],
        index: usize,
    ) -> Arc<HandlerContext<I>> {
        match index.checked_sub(1) {
            Some(i) => Arc::clone(&chain[i]),
            None => Arc::clone(&self.head),
        }
    }

    fn at_or_tail(&self, chain: &[Arc<HandlerContext<I>>], index: usize) -> Arc<HandlerContext<I>> {
        chain
            .get(index)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.tail))
    }

    fn commit(
        &self,
        chain: Vec<Arc<HandlerContext<I>>>,
        mutation: Mutation,
        ctx: &HandlerContext<I>,
    ) {
        self.contexts.store(Arc::new(chain));
        let epoch = self.epoch.fetch_add(1, Ordering::SeqCst) + 1;

        #[cfg(feature = "tracing")]
        tracing::debug!(
            pipeline = %self.name,
            op = mutation.as_str(),
            context = ctx.name(),
            epoch,
            "pipeline mutation applied"
        );

        #[cfg(not(feature = "tracing"))]
        {
            let _ = (mutation, ctx, epoch);
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    /// Pipeline name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operation catalogue this pipeline dispatches.
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    /// The head sentinel.
    pub fn head(&self) -> &Arc<HandlerContext<I>> {
        &self.head
    }

    /// The tail sentinel.
    pub fn tail(&self) -> &Arc<HandlerContext<I>> {
        &self.tail
    }

    /// Look up a context by name; `head` and `tail` resolve to the sentinels.
    pub fn context(&self, name: &str) -> Option<Arc<HandlerContext<I>>> {
        match name {
            HEAD => Some(Arc::clone(&self.head)),
            TAIL => Some(Arc::clone(&self.tail)),
            _ => {
                let current = self.contexts.load();
                position_of(&current, name).map(|i| Arc::clone(&current[i]))
            }
        }
    }

    /// The first handler context, if any.
    pub fn first(&self) -> Option<Arc<HandlerContext<I>>> {
        self.contexts.load().first().cloned()
    }

    /// The last handler context, if any.
    pub fn last(&self) -> Option<Arc<HandlerContext<I>>> {
        self.contexts.load().last().cloned()
    }

    /// Handler context names from head to tail.
    pub fn names(&self) -> Vec<String> {
        self.contexts
            .load()
            .iter()
            .map(|ctx| ctx.name().to_string())
            .collect()
    }

    /// Number of handler contexts, sentinels excluded.
    pub fn len(&self) -> usize {
        self.contexts.load().len()
    }

    /// Whether only the sentinels are present.
    pub fn is_empty(&self) -> bool {
        self.contexts.load().is_empty()
    }

    /// The current handler contexts, head to tail.
    pub fn snapshot(&self) -> Arc<Vec<Arc<HandlerContext<I>>>> {
        self.contexts.load_full()
    }

    /// Follow the links from the entry sentinel of `direction`, yielding the
    /// handler contexts in the order an operation of that direction meets them.
    pub fn walk(&self, direction: Direction) -> Walk<I> {
        Walk {
            cursor: Some(Arc::clone(self.entry(direction))),
            direction,
        }
    }

    /// Number of committed structural mutations.
    pub fn epoch(&self) -> u64 {
        self.epoch.load(Ordering::SeqCst)
    }
}

impl<I: Interface> fmt::Debug for Pipeline<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("interface", &I::NAME)
            .field("contexts", &self.names())
            .field("epoch", &self.epoch())
            .finish()
    }
}

fn position_of<I: Interface>(chain: &[Arc<HandlerContext<I>>], name: &str) -> Option<usize> {
    chain.iter().position(|ctx| ctx.name() == name)
}

fn insertion_index<I: Interface>(
    chain: &[Arc<HandlerContext<I>>],
    position: Position<'_>,
) -> Result<usize, PipelineError> {
    let not_found = |anchor: &str| PipelineError::NotFound(anchor.to_string());

    match position {
        Position::First => Ok(0),
        Position::Last => Ok(chain.len()),
        Position::Before(HEAD) => Err(PipelineError::SentinelAnchor(HEAD.to_string())),
        Position::Before(TAIL) => Ok(chain.len()),
        Position::Before(anchor) => position_of(chain, anchor).ok_or_else(|| not_found(anchor)),
        Position::After(HEAD) => Ok(0),
        Position::After(TAIL) => Err(PipelineError::SentinelAnchor(TAIL.to_string())),
        Position::After(anchor) => position_of(chain, anchor)
            .map(|i| i + 1)
            .ok_or_else(|| not_found(anchor)),
    }
}

/// Iterator over the handler contexts reachable by following links.
///
/// Created by [`Pipeline::walk`].
pub struct Walk<I: Interface> {
    cursor: Option<Arc<HandlerContext<I>>>,
    direction: Direction,
}

impl<I: Interface> Iterator for Walk<I> {
    type Item = Arc<HandlerContext<I>>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor.take()?;
        let next = current.neighbor(self.direction)?;
        if next.is_sentinel() {
            return None;
        }
        self.cursor = Some(Arc::clone(&next));
        Some(next)
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for constructing a [`Pipeline`].
///
/// # Example
///
/// ```rust,ignore
/// let pipeline = Pipeline::<CodecPipeline>::builder()
///     .name("client")
///     .handler("framer", Arc::new(Framer::default()))
///     .handler("logger", Arc::new(Logger))
///     .build()?;
/// ```
pub struct PipelineBuilder<I: Interface> {
    name: Option<String>,
    catalogue: Option<Catalogue>,
    bindings: Vec<(String, Box<dyn HandlerBinding<I::Handler>>)>,
}

impl<I: Interface> Default for PipelineBuilder<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Interface> PipelineBuilder<I> {
    /// Create a builder with the interface's name and catalogue.
    pub fn new() -> Self {
        Self {
            name: None,
            catalogue: None,
            bindings: Vec::new(),
        }
    }

    /// Set the pipeline name (defaults to the interface name).
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Use an externally supplied catalogue instead of [`Interface::catalogue`].
    pub fn catalogue(mut self, catalogue: Catalogue) -> Self {
        self.catalogue = Some(catalogue);
        self
    }

    /// Append a handler with a fixed binding.
    pub fn handler(self, name: impl Into<String>, handler: Arc<I::Handler>) -> Self {
        self.binding(name, FixedBinding::new(handler))
    }

    /// Append a context with any binding strategy.
    pub fn binding<B>(mut self, name: impl Into<String>, binding: B) -> Self
    where
        B: HandlerBinding<I::Handler>,
    {
        self.bindings.push((name.into(), Box::new(binding)));
        self
    }

    /// Build the pipeline, appending the configured contexts in order.
    pub fn build(self) -> Result<Arc<Pipeline<I>>, PipelineError> {
        let catalogue = match self.catalogue {
            Some(catalogue) => catalogue,
            None => I::catalogue()?,
        };
        let name = self.name.unwrap_or_else(|| I::NAME.to_string());
        let pipeline = Pipeline::with_catalogue(name, catalogue);

        for (name, binding) in self.bindings {
            pipeline.insert_boxed(Position::Last, name, binding)?;
        }

        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CatalogueError, DispatchError};

    type Trail = Vec<&'static str>;

    trait Tracer: Send + Sync {
        fn push(&self, trail: Trail, next: &Arc<HandlerContext<Trails>>)
        -> Result<Trail, DispatchError>;
        fn pop(&self, trail: Trail, prev: &Arc<HandlerContext<Trails>>)
        -> Result<Trail, DispatchError>;
    }

    struct Tag(&'static str);

    impl Tracer for Tag {
        fn push(
            &self,
            mut trail: Trail,
            next: &Arc<HandlerContext<Trails>>,
        ) -> Result<Trail, DispatchError> {
            trail.push(self.0);
            next.invoke::<Push>(trail)
        }

        fn pop(
            &self,
            mut trail: Trail,
            prev: &Arc<HandlerContext<Trails>>,
        ) -> Result<Trail, DispatchError> {
            trail.push(self.0);
            prev.invoke::<Pop>(trail)
        }
    }

    struct Trails;

    impl Interface for Trails {
        type Handler = dyn Tracer;
        const NAME: &'static str = "trails";

        fn catalogue() -> Result<Catalogue, CatalogueError> {
            Catalogue::builder()
                .operation::<Self, Push>()
                .operation::<Self, Pop>()
                .build()
        }
    }

    struct Push;

    impl Operation<Trails> for Push {
        const NAME: &'static str = "push";
        const DIRECTION: Direction = Direction::Forward;

        type Args = Trail;
        type Output = Trail;
        type Error = DispatchError;

        fn call(
            handler: &(dyn Tracer + 'static),
            args: Trail,
            routed: &Arc<HandlerContext<Trails>>,
        ) -> Result<Trail, DispatchError> {
            handler.push(args, routed)
        }

        fn absorb(args: Trail) -> Result<Trail, DispatchError> {
            Ok(args)
        }
    }

    struct Pop;

    impl Operation<Trails> for Pop {
        const NAME: &'static str = "pop";
        const DIRECTION: Direction = Direction::Reverse;

        type Args = Trail;
        type Output = Trail;
        type Error = DispatchError;

        fn call(
            handler: &(dyn Tracer + 'static),
            args: Trail,
            routed: &Arc<HandlerContext<Trails>>,
        ) -> Result<Trail, DispatchError> {
            handler.pop(args, routed)
        }

        fn absorb(args: Trail) -> Result<Trail, DispatchError> {
            Ok(args)
        }
    }

    fn tag(name: &'static str) -> Arc<dyn Tracer> {
        Arc::new(Tag(name))
    }

    fn abc() -> Arc<Pipeline<Trails>> {
        Pipeline::<Trails>::builder()
            .handler("a", tag("a"))
            .handler("b", tag("b"))
            .handler("c", tag("c"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_empty_pipeline_links_sentinels() {
        let pipeline = Pipeline::<Trails>::new().unwrap();

        assert!(pipeline.is_empty());
        assert_eq!(pipeline.name(), "trails");
        assert!(pipeline.first().is_none());

        let next = pipeline.head().find_next_ctx().unwrap();
        let prev = pipeline.tail().find_prev_ctx().unwrap();
        assert!(Arc::ptr_eq(&next, pipeline.tail()));
        assert!(Arc::ptr_eq(&prev, pipeline.head()));
        assert!(pipeline.head().find_prev_ctx().is_none());
        assert!(pipeline.tail().find_next_ctx().is_none());

        assert_eq!(pipeline.fire::<Push>(vec![]).unwrap(), Trail::new());
        assert_eq!(pipeline.fire::<Pop>(vec![]).unwrap(), Trail::new());
    }

    #[test]
    fn test_fire_routes_by_direction() {
        let pipeline = abc();

        assert_eq!(pipeline.fire::<Push>(vec![]).unwrap(), ["a", "b", "c"]);
        assert_eq!(pipeline.fire::<Pop>(vec![]).unwrap(), ["c", "b", "a"]);
    }

    #[test]
    fn test_invoke_mid_chain() {
        let pipeline = abc();
        let b = pipeline.context("b").unwrap();

        assert_eq!(b.invoke::<Push>(vec![]).unwrap(), ["b", "c"]);
        assert_eq!(b.invoke::<Pop>(vec![]).unwrap(), ["b", "a"]);
    }

    #[test]
    fn test_positions() {
        let pipeline = Pipeline::<Trails>::new().unwrap();
        pipeline.add_last("m", tag("m")).unwrap();
        pipeline.add_first("a", tag("a")).unwrap();
        pipeline.add_last("z", tag("z")).unwrap();
        pipeline.add_before("m", "l", tag("l")).unwrap();
        pipeline.add_after("m", "n", tag("n")).unwrap();
        pipeline.add_after(HEAD, "first", tag("first")).unwrap();
        pipeline.add_before(TAIL, "last", tag("last")).unwrap();

        assert_eq!(
            pipeline.names(),
            ["first", "a", "l", "m", "n", "z", "last"]
        );
        assert_eq!(
            pipeline.fire::<Push>(vec![]).unwrap(),
            ["first", "a", "l", "m", "n", "z", "last"]
        );
    }

    #[test]
    fn test_sentinel_anchors_rejected() {
        let pipeline = Pipeline::<Trails>::new().unwrap();

        assert_eq!(
            pipeline.add_before(HEAD, "x", tag("x")).unwrap_err(),
            PipelineError::SentinelAnchor("head".into())
        );
        assert_eq!(
            pipeline.add_after(TAIL, "x", tag("x")).unwrap_err(),
            PipelineError::SentinelAnchor("tail".into())
        );
        assert_eq!(
            pipeline.add_after("missing", "x", tag("x")).unwrap_err(),
            PipelineError::NotFound("missing".into())
        );
        assert!(pipeline.is_empty());
        assert_eq!(pipeline.epoch(), 0);
    }

    #[test]
    fn test_duplicate_and_reserved_names() {
        let pipeline = abc();

        assert_eq!(
            pipeline.add_last("b", tag("b")).unwrap_err(),
            PipelineError::DuplicateName("b".into())
        );
        assert_eq!(
            pipeline.add_last(HEAD, tag("h")).unwrap_err(),
            PipelineError::DuplicateName("head".into())
        );
        assert_eq!(
            pipeline.add_first(TAIL, tag("t")).unwrap_err(),
            PipelineError::DuplicateName("tail".into())
        );
    }

    #[test]
    fn test_remove_relinks_neighbors() {
        let pipeline = abc();
        let removed = pipeline.remove("b").unwrap();

        assert_eq!(pipeline.names(), ["a", "c"]);
        assert_eq!(pipeline.fire::<Push>(vec![]).unwrap(), ["a", "c"]);

        let a = pipeline.context("a").unwrap();
        let c = pipeline.context("c").unwrap();
        assert!(Arc::ptr_eq(&a.find_next_ctx().unwrap(), &c));
        assert!(Arc::ptr_eq(&c.find_prev_ctx().unwrap(), &a));

        // the removed context still reaches its old neighbors
        assert_eq!(removed.invoke::<Push>(vec![]).unwrap(), ["b", "c"]);
        assert_eq!(
            pipeline.remove("b").unwrap_err(),
            PipelineError::NotFound("b".into())
        );
    }

    #[test]
    fn test_link_to_dropped_context_is_rewired() {
        let pipeline = abc();
        let a = pipeline.context("a").unwrap();
        let c = pipeline.context("c").unwrap();

        drop(pipeline.remove("b").unwrap());

        assert!(Arc::ptr_eq(&a.find_next_ctx().unwrap(), &c));
        assert!(Arc::ptr_eq(&c.find_prev_ctx().unwrap(), &a));
        assert_eq!(a.invoke::<Push>(vec![]).unwrap(), ["a", "c"]);
    }

    #[test]
    fn test_removed_context_loses_dropped_neighbor() {
        let pipeline = abc();
        let removed = pipeline.remove("b").unwrap();
        drop(pipeline.remove("c").unwrap());

        assert!(removed.find_next_ctx().is_none());
        assert_eq!(
            removed.invoke::<Push>(vec![]).unwrap_err(),
            DispatchError::BrokenChain {
                context: "b".into(),
                direction: Direction::Forward,
            }
        );
        // the untouched side still resolves
        assert_eq!(removed.invoke::<Pop>(vec![]).unwrap(), ["b", "a"]);
    }

    #[test]
    fn test_replace_keeps_position() {
        let pipeline = abc();
        let old = pipeline.replace("b", tag("B")).unwrap();

        assert_eq!(old.name(), "b");
        assert_eq!(pipeline.names(), ["a", "b", "c"]);
        assert_eq!(pipeline.fire::<Push>(vec![]).unwrap(), ["a", "B", "c"]);
        assert_eq!(pipeline.fire::<Pop>(vec![]).unwrap(), ["c", "B", "a"]);
    }

    #[test]
    fn test_epoch_counts_commits() {
        let pipeline = abc();
        assert_eq!(pipeline.epoch(), 3);

        pipeline.remove("a").unwrap();
        pipeline.replace("c", tag("c2")).unwrap();
        let _ = pipeline.remove("missing");

        assert_eq!(pipeline.epoch(), 5);
    }

    #[test]
    fn test_walk_matches_snapshot() {
        let pipeline = abc();

        let forward: Vec<_> = pipeline
            .walk(Direction::Forward)
            .map(|ctx| ctx.name().to_string())
            .collect();
        let reverse: Vec<_> = pipeline
            .walk(Direction::Reverse)
            .map(|ctx| ctx.name().to_string())
            .collect();

        assert_eq!(forward, pipeline.names());
        assert_eq!(reverse, ["c", "b", "a"]);
    }

    #[test]
    fn test_pipeline_reference_is_stable() {
        let pipeline = abc();

        for ctx in pipeline.snapshot().iter() {
            assert!(Arc::ptr_eq(&ctx.pipeline().unwrap(), &pipeline));
        }
        assert!(Arc::ptr_eq(&pipeline.head().pipeline().unwrap(), &pipeline));
        assert!(Arc::ptr_eq(&pipeline.tail().pipeline().unwrap(), &pipeline));
    }

    #[test]
    fn test_context_detached_after_drop() {
        let pipeline = abc();
        let b = pipeline.context("b").unwrap();
        drop(pipeline);

        assert_eq!(
            b.pipeline().unwrap_err(),
            DispatchError::Detached {
                context: "b".into()
            }
        );
        assert!(b.find_next_ctx().is_none());
        assert_eq!(
            b.invoke::<Push>(vec![]).unwrap_err(),
            DispatchError::BrokenChain {
                context: "b".into(),
                direction: Direction::Forward,
            }
        );
    }
}
