//! Hot-swappable handler slot.

use arc_swap::ArcSwapOption;
use duplex_core::HandlerBinding;
use std::{borrow::Cow, fmt, sync::Arc};

/// A handler slot that can be refilled or emptied at any time.
///
/// Clones share the slot, so a caller can keep one handle after moving
/// another into a pipeline. Dispatch reads the slot without locking; a call
/// already running keeps the handler it resolved.
pub struct SwappableBinding<H: ?Sized> {
    slot: Arc<ArcSwapOption<Arc<H>>>,
}

impl<H: ?Sized> SwappableBinding<H> {
    /// A slot holding `handler`.
    pub fn new(handler: Arc<H>) -> Self {
        Self {
            slot: Arc::new(ArcSwapOption::from_pointee(handler)),
        }
    }

    /// An empty slot.
    pub fn empty() -> Self {
        Self {
            slot: Arc::new(ArcSwapOption::empty()),
        }
    }

    /// Put `handler` in the slot and return the previous one.
    pub fn swap(&self, handler: Arc<H>) -> Option<Arc<H>> {
        self.slot
            .swap(Some(Arc::new(handler)))
            .map(Arc::unwrap_or_clone)
    }

    /// Empty the slot and return what it held.
    pub fn clear(&self) -> Option<Arc<H>> {
        self.slot.swap(None).map(Arc::unwrap_or_clone)
    }

    /// The handler currently in the slot.
    pub fn current(&self) -> Option<Arc<H>> {
        self.slot.load_full().map(Arc::unwrap_or_clone)
    }

    /// Whether the slot holds a handler.
    pub fn is_bound(&self) -> bool {
        self.slot.load().is_some()
    }
}

impl<H: ?Sized> Clone for SwappableBinding<H> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<H: ?Sized> fmt::Debug for SwappableBinding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SwappableBinding")
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl<H: ?Sized + Send + Sync + 'static> HandlerBinding<H> for SwappableBinding<H> {
    fn resolve(&self) -> Option<Arc<H>> {
        self.current()
    }

    fn describe(&self) -> Cow<'_, str> {
        if self.is_bound() {
            Cow::Borrowed("swappable")
        } else {
            Cow::Borrowed("swappable (empty)")
        }
    }
}
