//! Handler binding strategies.
//!
//! A context never stores its handler as a plain field. It asks a
//! [`HandlerBinding`] each time it dispatches, which lets the strategy vary
//! (a fixed instance, a name looked up at call time, a hot-swappable slot)
//! while the dispatch logic stays identical.

use std::{borrow::Cow, fmt, sync::Arc};

/// Resolves the handler of one context.
pub trait HandlerBinding<H: ?Sized>: Send + Sync + 'static {
    /// The handler to invoke, or `None` when nothing is bound right now.
    fn resolve(&self) -> Option<Arc<H>>;

    /// Short label for diagnostics.
    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed(std::any::type_name::<Self>())
    }
}

impl<H: ?Sized, B: HandlerBinding<H> + ?Sized> HandlerBinding<H> for Box<B> {
    fn resolve(&self) -> Option<Arc<H>> {
        (**self).resolve()
    }

    fn describe(&self) -> Cow<'_, str> {
        (**self).describe()
    }
}

/// A binding that owns one handler instance for the context's whole life.
pub struct FixedBinding<H: ?Sized> {
    handler: Arc<H>,
}

impl<H: ?Sized> FixedBinding<H> {
    /// Bind a handler instance.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// The bound handler.
    pub fn handler(&self) -> &Arc<H> {
        &self.handler
    }
}

impl<H: ?Sized> Clone for FixedBinding<H> {
    fn clone(&self) -> Self {
        Self {
            handler: Arc::clone(&self.handler),
        }
    }
}

impl<H: ?Sized> fmt::Debug for FixedBinding<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FixedBinding").finish_non_exhaustive()
    }
}

impl<H: ?Sized + Send + Sync + 'static> HandlerBinding<H> for FixedBinding<H> {
    fn resolve(&self) -> Option<Arc<H>> {
        Some(Arc::clone(&self.handler))
    }

    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed("fixed")
    }
}

/// Binding of the head and tail sentinels: there is no handler to resolve.
pub(crate) struct SentinelBinding;

impl<H: ?Sized + 'static> HandlerBinding<H> for SentinelBinding {
    fn resolve(&self) -> Option<Arc<H>> {
        None
    }

    fn describe(&self) -> Cow<'_, str> {
        Cow::Borrowed("sentinel")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    trait Greeter: Send + Sync {
        fn greet(&self) -> &'static str;
    }

    struct Hello;

    impl Greeter for Hello {
        fn greet(&self) -> &'static str {
            "hello"
        }
    }

    #[test]
    fn test_fixed_binding_resolves_same_instance() {
        let handler: Arc<dyn Greeter> = Arc::new(Hello);
        let binding = FixedBinding::new(Arc::clone(&handler));

        let first = binding.resolve().unwrap();
        let second = binding.resolve().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.greet(), "hello");
        assert_eq!(binding.describe(), "fixed");
    }

    #[test]
    fn test_sentinel_binding_resolves_nothing() {
        let binding: Box<dyn HandlerBinding<dyn Greeter>> = Box::new(SentinelBinding);
        assert!(binding.resolve().is_none());
        assert_eq!(binding.describe(), "sentinel");
    }
}
