use std::time::Instant;

use tracing::{info, warn};

use crate::context::Context;
use crate::handler::{BoxFuture, BoxedHandler, Handler};
use crate::middleware::Middleware;

/// Request logging middleware. See [`trace()`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Trace;

/// One log event per request: method, path, status and latency.
///
/// Register it globally so it is outermost and sees the time spent in every
/// other middleware:
///
/// ```rust
/// use sprout::{App, middleware};
///
/// let mut app = App::new();
/// app.register(middleware::trace());
/// ```
pub fn trace() -> Trace {
    Trace
}

impl Middleware for Trace {
    fn wrap(&self, next: BoxedHandler) -> BoxedHandler {
        Traced { next }.into_boxed_handler()
    }
}

struct Traced {
    next: BoxedHandler,
}

impl Handler for Traced {
    fn call<'a>(&'a self, ctx: &'a mut Context) -> BoxFuture<'a> {
        Box::pin(async move {
            let start = Instant::now();
            let result = self.next.call(ctx).await;
            let latency_us = u64::try_from(start.elapsed().as_micros()).unwrap_or(u64::MAX);

            match &result {
                Ok(()) => info!(
                    method = %ctx.method(),
                    path = ctx.path(),
                    status = ctx.response().status().as_u16(),
                    latency_us,
                    "request"
                ),
                // The error handler has not run yet, so there is no final status.
                Err(e) => warn!(
                    method = %ctx.method(),
                    path = ctx.path(),
                    error = %e,
                    latency_us,
                    "request failed"
                ),
            }
            result
        })
    }
}
