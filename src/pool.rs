//! Free-list of reusable request contexts.

use std::net::SocketAddr;
use std::sync::Mutex;

use bytes::Bytes;

use crate::context::Context;

/// A concurrency-safe pool of [`Context`] values.
///
/// `acquire` pops an idle context (or builds one) and loads the request into
/// it; `release` resets the context and parks it for the next request. The
/// lock is held only for the push or pop, never while a handler runs.
#[derive(Debug)]
pub struct ContextPool {
    idle: Mutex<Vec<Context>>,
    capacity: usize,
}

impl ContextPool {
    /// A pool that keeps at most `capacity` idle contexts.
    pub fn new(capacity: usize) -> Self {
        Self { idle: Mutex::new(Vec::new()), capacity }
    }

    pub fn acquire(&self, request: http::Request<Bytes>, remote_addr: Option<SocketAddr>) -> Context {
        let mut ctx = self.lock().pop().unwrap_or_default();
        ctx.bind(request, remote_addr);
        ctx
    }

    /// Resets `ctx` and keeps it for reuse, or drops it if the pool is full.
    pub fn release(&self, mut ctx: Context) {
        ctx.reset();
        let mut idle = self.lock();
        if idle.len() < self.capacity {
            idle.push(ctx);
        }
    }

    pub fn idle(&self) -> usize {
        self.lock().len()
    }

    // A poisoned lock only means another request panicked mid push/pop; the
    // Vec itself is still consistent.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Context>> {
        self.idle.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}
