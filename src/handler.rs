//! Handler trait and type erasure.
//!
//! # How handlers are stored
//!
//! Every route trie holds handlers of *different* concrete types, so they are
//! erased behind `Arc<dyn Handler>` and stored uniformly:
//!
//! ```text
//! handler_fn(|ctx| Box::pin(async move { … }))   ← user writes this
//!        ↓ app.get("/", h)
//! h.into_boxed_handler()                          ← Arc::new(FnHandler(f))
//!        ↓ stored in the route trie as BoxedHandler
//! handler.call(&mut ctx)  at request time         ← one virtual call
//! ```
//!
//! A handler borrows the request [`Context`] mutably for the lifetime of its
//! future. That is why the future type carries the borrow's lifetime and why
//! closures return `Box::pin(async move { … })` rather than being `async fn`s.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::context::Context;

/// Any failure a handler or middleware can return.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// `Ok(())` once the handler has written its response into the context.
pub type HandlerResult = Result<(), BoxError>;

/// The future returned by [`Handler::call`], borrowing the context for `'a`.
pub type BoxFuture<'a> = Pin<Box<dyn Future<Output = HandlerResult> + Send + 'a>>;

/// A heap-allocated, type-erased handler shared across concurrent requests.
pub type BoxedHandler = Arc<dyn Handler>;

/// Something that can serve a request.
///
/// Implement it on your own types, or wrap a closure with [`handler_fn`].
pub trait Handler: Send + Sync + 'static {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a>;

    #[doc(hidden)]
    fn into_boxed_handler(self) -> BoxedHandler
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

/// Already erased: hand back the same `Arc` instead of wrapping it again.
impl Handler for BoxedHandler {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a> {
        (**self).call(ctx)
    }

    fn into_boxed_handler(self) -> BoxedHandler {
        self
    }
}

/// Wraps a closure or function as a [`Handler`].
///
/// ```rust
/// use http::StatusCode;
/// use sprout::handler_fn;
///
/// let hello = handler_fn(|ctx| Box::pin(async move {
///     ctx.text(StatusCode::OK, "hello")
/// }));
/// # let _ = hello;
/// ```
pub fn handler_fn<F>(f: F) -> FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
{
    FnHandler(f)
}

/// Newtype produced by [`handler_fn`].
pub struct FnHandler<F>(F);

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a mut Context) -> BoxFuture<'a> + Send + Sync + 'static,
{
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a> {
        (self.0)(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn assert_is_handler<H: Handler>(_handler: &H) {}

    fn named(ctx: &mut Context) -> BoxFuture<'_> {
        Box::pin(async move { ctx.no_content() })
    }

    #[test]
    fn closures_and_fns_are_handlers() {
        let closure = handler_fn(|ctx| Box::pin(async move { ctx.text(StatusCode::OK, "hi") }));
        assert_is_handler(&closure);
        assert_is_handler(&handler_fn(named));
    }

    #[test]
    fn boxing_an_erased_handler_keeps_the_same_arc() {
        let boxed = handler_fn(named).into_boxed_handler();
        let again = Arc::clone(&boxed).into_boxed_handler();
        assert!(Arc::ptr_eq(&boxed, &again));
    }

    #[tokio::test]
    async fn call_writes_into_context() {
        let handler = handler_fn(|ctx| Box::pin(async move { ctx.text(StatusCode::CREATED, "made") }));
        let mut ctx = Context::default();
        handler.call(&mut ctx).await.unwrap();
        assert_eq!(ctx.response().status(), StatusCode::CREATED);
        assert_eq!(ctx.response().body(), b"made");
    }
}
