//! Testing utilities for duplex.
//!
//! This module provides a ready-made pipeline interface and handlers that
//! record what reaches them, to make testing chain behavior easier.
//!
//! # Features
//!
//! - [`Probe`]: an interface with a forward [`Read`] and a reverse [`Write`]
//! - [`RecordingHandler`]: a [`ProbeHandler`] that logs each visit and then
//!   reacts as its [`Reaction`] says
//! - [`CallLog`]: a shared, ordered log of visits

use duplex_core::{
    Catalogue, CatalogueError, Direction, DispatchError, HandlerContext, Interface, Operation,
};
use parking_lot::Mutex;
use std::{fmt, sync::Arc};
use thiserror::Error;

// ============================================================================
// Probe Interface
// ============================================================================

/// Handler trait of the [`Probe`] interface.
pub trait ProbeHandler: Send + Sync {
    /// Inbound message, routed with the next context.
    fn read(&self, msg: String, next: &Arc<HandlerContext<Probe>>) -> Result<(), ProbeError>;

    /// Outbound message, routed with the previous context. Returns the
    /// number of bytes that reached the head end.
    fn write(&self, msg: String, prev: &Arc<HandlerContext<Probe>>) -> Result<usize, ProbeError>;
}

/// A two-operation interface for exercising pipelines.
#[derive(Debug, Clone, Copy, Default)]
pub struct Probe;

impl Interface for Probe {
    type Handler = dyn ProbeHandler;
    const NAME: &'static str = "probe";

    fn catalogue() -> Result<Catalogue, CatalogueError> {
        Catalogue::builder()
            .operation::<Self, Read>()
            .operation::<Self, Write>()
            .build()
    }
}

/// Forward, void operation of [`Probe`].
#[derive(Debug, Clone, Copy)]
pub struct Read;

impl Operation<Probe> for Read {
    const NAME: &'static str = "read";
    const DIRECTION: Direction = Direction::Forward;
    const PARAMETERS: &'static [(&'static str, &'static str)] = &[("msg", "String")];

    type Args = String;
    type Output = ();
    type Error = ProbeError;

    fn call(
        handler: &(dyn ProbeHandler + 'static),
        msg: String,
        next: &Arc<HandlerContext<Probe>>,
    ) -> Result<(), ProbeError> {
        handler.read(msg, next)
    }

    fn absorb(_msg: String) -> Result<(), ProbeError> {
        Ok(())
    }
}

/// Reverse, value-returning operation of [`Probe`].
///
/// When a write runs off the head end, the whole message counts as written.
#[derive(Debug, Clone, Copy)]
pub struct Write;

impl Operation<Probe> for Write {
    const NAME: &'static str = "write";
    const DIRECTION: Direction = Direction::Reverse;
    const PARAMETERS: &'static [(&'static str, &'static str)] = &[("msg", "String")];

    type Args = String;
    type Output = usize;
    type Error = ProbeError;

    fn call(
        handler: &(dyn ProbeHandler + 'static),
        msg: String,
        prev: &Arc<HandlerContext<Probe>>,
    ) -> Result<usize, ProbeError> {
        handler.write(msg, prev)
    }

    fn absorb(msg: String) -> Result<usize, ProbeError> {
        Ok(msg.len())
    }
}

/// Errors produced by [`Probe`] pipelines.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The chain itself failed.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// A handler configured with [`Reaction::Fail`] refused the call.
    #[error("handler `{handler}` rejected `{operation}`")]
    Rejected {
        /// Handler name.
        handler: String,
        /// Operation name.
        operation: &'static str,
    },
}

// ============================================================================
// Call Log
// ============================================================================

/// One recorded handler visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    /// Name of the handler that was visited.
    pub handler: String,
    /// Operation name.
    pub operation: &'static str,
    /// Message the handler received.
    pub msg: String,
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.handler, self.operation)
    }
}

/// Shared, ordered log of handler visits.
///
/// Clones share the same log.
#[derive(Clone, Default)]
pub struct CallLog {
    calls: Arc<Mutex<Vec<Call>>>,
}

impl CallLog {
    /// Create an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a visit.
    pub fn record(&self, handler: &str, operation: &'static str, msg: &str) {
        self.calls.lock().push(Call {
            handler: handler.to_string(),
            operation,
            msg: msg.to_string(),
        });
    }

    /// All visits, oldest first.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    /// Visits rendered as `handler.operation`, oldest first.
    pub fn entries(&self) -> Vec<String> {
        self.calls.lock().iter().map(Call::to_string).collect()
    }

    /// Number of visits.
    pub fn len(&self) -> usize {
        self.calls.lock().len()
    }

    /// Whether nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.calls.lock().is_empty()
    }

    /// Forget all visits.
    pub fn clear(&self) {
        self.calls.lock().clear();
    }
}

impl fmt::Debug for CallLog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.entries()).finish()
    }
}

// ============================================================================
// Recording Handler
// ============================================================================

/// What a [`RecordingHandler`] does after logging a visit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Reaction {
    /// Pass the call on to the routed neighbor.
    #[default]
    Forward,
    /// Stop the call here. `write` returns `0`.
    Consume,
    /// Stop the call with [`ProbeError::Rejected`].
    Fail,
}

/// A [`ProbeHandler`] that records every visit in a [`CallLog`].
///
/// # Example
///
/// ```rust,ignore
/// let log = CallLog::new();
/// let pipeline = Pipeline::<Probe>::builder()
///     .handler("H1", RecordingHandler::new("H1", &log).shared())
///     .build()?;
///
/// pipeline.fire::<Read>("hello".into())?;
/// assert_eq!(log.entries(), ["H1.read"]);
/// ```
pub struct RecordingHandler {
    name: String,
    log: CallLog,
    reaction: Mutex<Reaction>,
}

impl RecordingHandler {
    /// A handler that forwards every call.
    pub fn new(name: impl Into<String>, log: &CallLog) -> Self {
        Self::with_reaction(name, log, Reaction::Forward)
    }

    /// A handler with a specific reaction.
    pub fn with_reaction(name: impl Into<String>, log: &CallLog, reaction: Reaction) -> Self {
        Self {
            name: name.into(),
            log: log.clone(),
            reaction: Mutex::new(reaction),
        }
    }

    /// Handler name used in the log.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current reaction.
    pub fn reaction(&self) -> Reaction {
        *self.reaction.lock()
    }

    /// Change the reaction for subsequent calls.
    pub fn set_reaction(&self, reaction: Reaction) {
        *self.reaction.lock() = reaction;
    }

    /// Wrap in an `Arc` ready to be added to a pipeline.
    pub fn shared(self) -> Arc<dyn ProbeHandler> {
        Arc::new(self)
    }

    fn rejected(&self, operation: &'static str) -> ProbeError {
        ProbeError::Rejected {
            handler: self.name.clone(),
            operation,
        }
    }
}

impl fmt::Debug for RecordingHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordingHandler")
            .field("name", &self.name)
            .field("reaction", &self.reaction())
            .finish_non_exhaustive()
    }
}

impl ProbeHandler for RecordingHandler {
    fn read(&self, msg: String, next: &Arc<HandlerContext<Probe>>) -> Result<(), ProbeError> {
        self.log.record(&self.name, Read::NAME, &msg);
        match self.reaction() {
            Reaction::Forward => next.invoke::<Read>(msg),
            Reaction::Consume => Ok(()),
            Reaction::Fail => Err(self.rejected(Read::NAME)),
        }
    }

    fn write(&self, msg: String, prev: &Arc<HandlerContext<Probe>>) -> Result<usize, ProbeError> {
        self.log.record(&self.name, Write::NAME, &msg);
        match self.reaction() {
            Reaction::Forward => prev.invoke::<Write>(msg),
            Reaction::Consume => Ok(0),
            Reaction::Fail => Err(self.rejected(Write::NAME)),
        }
    }
}
