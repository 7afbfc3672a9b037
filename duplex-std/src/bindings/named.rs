//! Name-resolved handler bindings.

use duplex_core::HandlerBinding;
use parking_lot::RwLock;
use std::{borrow::Cow, collections::HashMap, fmt, sync::Arc};

/// A shared table of handlers keyed by name.
///
/// Contexts bound with [`NamedBinding`] look their handler up here on every
/// dispatch, so registering or unregistering takes effect on the next call.
pub struct HandlerRegistry<H: ?Sized> {
    handlers: RwLock<HashMap<String, Arc<H>>>,
}

impl<H: ?Sized> Default for HandlerRegistry<H> {
    fn default() -> Self {
        Self {
            handlers: RwLock::new(HashMap::new()),
        }
    }
}

impl<H: ?Sized> HandlerRegistry<H> {
    /// Create an empty registry.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Register a handler, returning the one previously stored under `name`.
    pub fn register(&self, name: impl Into<String>, handler: Arc<H>) -> Option<Arc<H>> {
        self.handlers.write().insert(name.into(), handler)
    }

    /// Remove and return the handler stored under `name`.
    pub fn unregister(&self, name: &str) -> Option<Arc<H>> {
        self.handlers.write().remove(name)
    }

    /// The handler stored under `name`.
    pub fn get(&self, name: &str) -> Option<Arc<H>> {
        self.handlers.read().get(name).cloned()
    }

    /// Whether a handler is stored under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.read().contains_key(name)
    }

    /// Number of registered handlers.
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.handlers.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// A binding that resolves `key` against this registry.
    pub fn bind(self: &Arc<Self>, key: impl Into<String>) -> NamedBinding<H> {
        NamedBinding {
            registry: Arc::clone(self),
            key: key.into(),
        }
    }
}

impl<H: ?Sized> fmt::Debug for HandlerRegistry<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("names", &self.names())
            .finish()
    }
}

/// A binding that looks its handler up in a [`HandlerRegistry`] each time.
pub struct NamedBinding<H: ?Sized> {
    registry: Arc<HandlerRegistry<H>>,
    key: String,
}

impl<H: ?Sized> NamedBinding<H> {
    /// Registry key this binding resolves.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<H: ?Sized> Clone for NamedBinding<H> {
    fn clone(&self) -> Self {
        Self {
            registry: Arc::clone(&self.registry),
            key: self.key.clone(),
        }
    }
}

impl<H: ?Sized> fmt::Debug for NamedBinding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedBinding")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

impl<H: ?Sized + Send + Sync + 'static> HandlerBinding<H> for NamedBinding<H> {
    fn resolve(&self) -> Option<Arc<H>> {
        self.registry.get(&self.key)
    }

    fn describe(&self) -> Cow<'_, str> {
        Cow::Owned(format!("named `{}`", self.key))
    }
}
