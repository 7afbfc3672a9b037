//! Shared fixtures for the integration tests.
//!
//! `Stages` is a hand-written interface whose handler trait forwards by
//! default, so handlers only override the operations they care about.

#![allow(dead_code)]

use duplex::{
    Catalogue, CatalogueError, Direction, DispatchError, HandlerContext, Interface, Operation,
};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StageError {
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    #[error("empty message")]
    Empty,
}

pub trait Stage: Send + Sync {
    fn inbound(&self, msg: String, next: &Arc<HandlerContext<Stages>>) -> Result<(), StageError> {
        next.invoke::<Inbound>(msg)
    }

    fn outbound(
        &self,
        msg: String,
        prev: &Arc<HandlerContext<Stages>>,
    ) -> Result<usize, StageError> {
        prev.invoke::<Outbound>(msg)
    }

    fn flush(&self, next: &Arc<HandlerContext<Stages>>) -> Result<(), StageError> {
        next.invoke::<Flush>(())
    }
}

pub struct Stages;

impl Interface for Stages {
    type Handler = dyn Stage;
    const NAME: &'static str = "stages";

    fn catalogue() -> Result<Catalogue, CatalogueError> {
        Catalogue::builder()
            .operation::<Self, Inbound>()
            .operation::<Self, Outbound>()
            .operation::<Self, Flush>()
            .build()
    }
}

pub struct Inbound;

impl Operation<Stages> for Inbound {
    const NAME: &'static str = "inbound";
    const DIRECTION: Direction = Direction::Forward;
    const PARAMETERS: &'static [(&'static str, &'static str)] = &[("msg", "String")];

    type Args = String;
    type Output = ();
    type Error = StageError;

    fn call(
        handler: &(dyn Stage + 'static),
        msg: String,
        next: &Arc<HandlerContext<Stages>>,
    ) -> Result<(), StageError> {
        handler.inbound(msg, next)
    }

    fn absorb(_msg: String) -> Result<(), StageError> {
        Ok(())
    }
}

pub struct Outbound;

impl Operation<Stages> for Outbound {
    const NAME: &'static str = "outbound";
    const DIRECTION: Direction = Direction::Reverse;
    const PARAMETERS: &'static [(&'static str, &'static str)] = &[("msg", "String")];

    type Args = String;
    type Output = usize;
    type Error = StageError;

    fn call(
        handler: &(dyn Stage + 'static),
        msg: String,
        prev: &Arc<HandlerContext<Stages>>,
    ) -> Result<usize, StageError> {
        handler.outbound(msg, prev)
    }

    fn absorb(msg: String) -> Result<usize, StageError> {
        Ok(msg.len())
    }
}

pub struct Flush;

impl Operation<Stages> for Flush {
    const NAME: &'static str = "flush";
    const DIRECTION: Direction = Direction::Forward;

    type Args = ();
    type Output = ();
    type Error = StageError;

    fn call(
        handler: &(dyn Stage + 'static),
        _args: (),
        next: &Arc<HandlerContext<Stages>>,
    ) -> Result<(), StageError> {
        handler.flush(next)
    }

    fn absorb(_args: ()) -> Result<(), StageError> {
        Ok(())
    }
}

/// Not part of the `Stages` catalogue.
pub struct Reset;

impl Operation<Stages> for Reset {
    const NAME: &'static str = "reset";
    const DIRECTION: Direction = Direction::Forward;

    type Args = ();
    type Output = ();
    type Error = StageError;

    fn call(
        _handler: &(dyn Stage + 'static),
        _args: (),
        _next: &Arc<HandlerContext<Stages>>,
    ) -> Result<(), StageError> {
        Ok(())
    }

    fn absorb(_args: ()) -> Result<(), StageError> {
        Ok(())
    }
}

/// Same name as `Flush`, opposite direction.
pub struct ReverseFlush;

impl Operation<Stages> for ReverseFlush {
    const NAME: &'static str = "flush";
    const DIRECTION: Direction = Direction::Reverse;

    type Args = ();
    type Output = ();
    type Error = StageError;

    fn call(
        handler: &(dyn Stage + 'static),
        _args: (),
        prev: &Arc<HandlerContext<Stages>>,
    ) -> Result<(), StageError> {
        handler.flush(prev)
    }

    fn absorb(_args: ()) -> Result<(), StageError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// Forwards everything untouched.
pub struct Passthrough;

impl Stage for Passthrough {}

/// Upper-cases messages in both directions.
pub struct Upper;

impl Stage for Upper {
    fn inbound(&self, msg: String, next: &Arc<HandlerContext<Stages>>) -> Result<(), StageError> {
        next.invoke::<Inbound>(msg.to_uppercase())
    }

    fn outbound(
        &self,
        msg: String,
        prev: &Arc<HandlerContext<Stages>>,
    ) -> Result<usize, StageError> {
        prev.invoke::<Outbound>(msg.to_uppercase())
    }
}

/// Rejects empty inbound messages.
pub struct NonEmpty;

impl Stage for NonEmpty {
    fn inbound(&self, msg: String, next: &Arc<HandlerContext<Stages>>) -> Result<(), StageError> {
        if msg.is_empty() {
            return Err(StageError::Empty);
        }
        next.invoke::<Inbound>(msg)
    }
}

/// Consumes inbound messages and counts flushes.
#[derive(Default)]
pub struct Sink {
    seen: Mutex<Vec<String>>,
    flushes: Mutex<usize>,
}

impl Sink {
    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }

    pub fn flushes(&self) -> usize {
        *self.flushes.lock().unwrap()
    }
}

impl Stage for Sink {
    fn inbound(&self, msg: String, _next: &Arc<HandlerContext<Stages>>) -> Result<(), StageError> {
        self.seen.lock().unwrap().push(msg);
        Ok(())
    }

    fn flush(&self, next: &Arc<HandlerContext<Stages>>) -> Result<(), StageError> {
        *self.flushes.lock().unwrap() += 1;
        next.invoke::<Flush>(())
    }
}
