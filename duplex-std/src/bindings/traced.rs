//! Observing wrapper around another binding.

use duplex_core::HandlerBinding;
use std::{
    borrow::Cow,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

/// A binding that delegates to `B` and records every resolution miss.
///
/// With the `tracing` feature each miss is also logged at `warn` level,
/// since it ends the dispatch with an unresolved-handler error.
pub struct TracedBinding<B> {
    inner: B,
    label: String,
    misses: AtomicU64,
}

impl<B> TracedBinding<B> {
    /// Wrap `inner`, logging misses under `label`.
    pub fn new(label: impl Into<String>, inner: B) -> Self {
        Self {
            inner,
            label: label.into(),
            misses: AtomicU64::new(0),
        }
    }

    /// The wrapped binding.
    pub fn inner(&self) -> &B {
        &self.inner
    }

    /// Number of resolutions that came back empty.
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }
}

impl<H, B> HandlerBinding<H> for TracedBinding<B>
where
    H: ?Sized,
    B: HandlerBinding<H>,
{
    fn resolve(&self) -> Option<Arc<H>> {
        let resolved = self.inner.resolve();
        if resolved.is_none() {
            let misses = self.misses.fetch_add(1, Ordering::Relaxed) + 1;

            #[cfg(feature = "tracing")]
            {
                tracing::warn!(
                    label = %self.label,
                    binding = %self.inner.describe(),
                    misses,
                    "handler binding resolved nothing"
                );
            }
            #[cfg(not(feature = "tracing"))]
            {
                let _ = misses;
            }
        }
        resolved
    }

    fn describe(&self) -> Cow<'_, str> {
        Cow::Owned(format!("traced `{}` ({})", self.label, self.inner.describe()))
    }
}
