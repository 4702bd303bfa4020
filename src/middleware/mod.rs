//! Middleware layer.
//!
//! A middleware takes the next handler and returns a new handler that wraps
//! it. It can act before and after `next`, or answer on its own and never
//! call `next` at all.
//!
//! Middleware is attached to path prefixes in a [`MiddlewareTree`]. For a
//! request, every middleware registered on a prefix of its path is collected
//! root-first and composed so the first collected one runs outermost:
//!
//! ```text
//! register(A)                 request /users/hello/x
//! combine("/users", B)   ──►  A( B( C( handler ) ) )
//! combine("/users/hello", C)
//! ```
//!
//! Built-in middleware:
//! - [`trace()`] — one log event per request with method, path, status, latency

mod trace;
mod tree;

use std::sync::Arc;

use crate::handler::BoxedHandler;

pub use trace::{Trace, trace};
pub use tree::{MiddlewareNode, MiddlewareTree};

/// A type-erased middleware shared by every request it applies to.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// Wraps a handler in cross-cutting behavior.
pub trait Middleware: Send + Sync + 'static {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler;

    #[doc(hidden)]
    fn into_boxed_middleware(self) -> BoxedMiddleware
    where
        Self: Sized,
    {
        Arc::new(self)
    }
}

impl Middleware for BoxedMiddleware {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (**self).wrap(next)
    }

    fn into_boxed_middleware(self) -> BoxedMiddleware {
        self
    }
}

/// Wraps a `Fn(next) -> handler` closure as a [`Middleware`].
///
/// ```rust
/// use std::sync::Arc;
/// use http::HeaderValue;
/// use sprout::{Handler, handler_fn, middleware::middleware_fn};
///
/// let powered_by = middleware_fn(|next| {
///     handler_fn(move |ctx| {
///         let next = Arc::clone(&next);
///         Box::pin(async move {
///             ctx.set_response_header("x-powered-by", HeaderValue::from_static("sprout"));
///             next.call(ctx).await
///         })
///     })
///     .into_boxed_handler()
/// });
/// # let _ = powered_by;
/// ```
pub fn middleware_fn<F>(f: F) -> FnMiddleware<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    FnMiddleware(f)
}

/// Newtype produced by [`middleware_fn`].
pub struct FnMiddleware<F>(F);

impl<F> Middleware for FnMiddleware<F>
where
    F: Fn(BoxedHandler) -> BoxedHandler + Send + Sync + 'static,
{
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        (self.0)(next)
    }
}

/// Composes `middlewares` around `handler`, first one outermost.
pub fn chain<'m, I>(middlewares: I, handler: BoxedHandler) -> BoxedHandler
where
    I: IntoIterator<Item = &'m BoxedMiddleware>,
    I::IntoIter: DoubleEndedIterator,
{
    middlewares.into_iter().rev().fold(handler, |next, middleware| middleware.wrap(next))
}
