// SPDX-License-Identifier: MIT OR Apache-2.0
//! The hook trait a twirk server calls around each request.

use crate::context::RequestContext;
use std::sync::Arc;
use tracing::debug;
use twirk_error::TwirkError;

/// Callbacks invoked by a twirk server at fixed points of each request.
///
/// Every method defaults to a no-op. An error from `request_received` or
/// `request_routed` aborts the request and is sent to the client instead of
/// calling the service.
pub trait ServerHooks: Send + Sync {
    /// The request arrived, before routing.
    fn request_received(&self, _ctx: &mut RequestContext) -> Result<(), TwirkError> {
        Ok(())
    }

    /// The request was routed; `ctx.method()` is set.
    fn request_routed(&self, _ctx: &mut RequestContext) -> Result<(), TwirkError> {
        Ok(())
    }

    /// A successful response is about to be written.
    fn response_prepared(&self, _ctx: &mut RequestContext) {}

    /// The response, successful or not, was written.
    fn response_sent(&self, _ctx: &RequestContext) {}

    /// The request failed with `err`; `ctx.status_code()` is set.
    fn error(&self, _ctx: &mut RequestContext, _err: &TwirkError) {}
}

/// Hooks that do nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopHooks;

impl ServerHooks for NoopHooks {}

// ---------------------------------------------------------------------------
// ChainHooks
// ---------------------------------------------------------------------------

/// Runs several hooks in order.
///
/// For the fallible callbacks the first error stops the chain and is
/// returned; later hooks are not called.
#[derive(Clone, Default)]
pub struct ChainHooks {
    hooks: Vec<Arc<dyn ServerHooks>>,
}

/// Chain `hooks` into one [`ServerHooks`] value.
pub fn chain_hooks(hooks: impl IntoIterator<Item = Arc<dyn ServerHooks>>) -> ChainHooks {
    ChainHooks {
        hooks: hooks.into_iter().collect(),
    }
}

impl ChainHooks {
    /// Number of chained hooks.
    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    /// Whether the chain is empty.
    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }
}

impl std::fmt::Debug for ChainHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainHooks")
            .field("len", &self.hooks.len())
            .finish()
    }
}

impl ServerHooks for ChainHooks {
    fn request_received(&self, ctx: &mut RequestContext) -> Result<(), TwirkError> {
        self.hooks.iter().try_for_each(|h| h.request_received(ctx))
    }

    fn request_routed(&self, ctx: &mut RequestContext) -> Result<(), TwirkError> {
        self.hooks.iter().try_for_each(|h| h.request_routed(ctx))
    }

    fn response_prepared(&self, ctx: &mut RequestContext) {
        for h in &self.hooks {
            h.response_prepared(ctx);
        }
    }

    fn response_sent(&self, ctx: &RequestContext) {
        for h in &self.hooks {
            h.response_sent(ctx);
        }
    }

    fn error(&self, ctx: &mut RequestContext, err: &TwirkError) {
        for h in &self.hooks {
            h.error(ctx, err);
        }
    }
}

// ---------------------------------------------------------------------------
// Serving
// ---------------------------------------------------------------------------

/// Drive `hooks` around one service call the way the generated server does.
///
/// On failure the response status comes from the error's code, the `error`
/// hook runs, and `response_sent` still fires. On success the status is 200
/// and `response_prepared` runs before `response_sent`.
pub fn serve_call<H, T, F>(
    hooks: &H,
    ctx: &mut RequestContext,
    method: &str,
    handler: F,
) -> Result<T, TwirkError>
where
    H: ServerHooks + ?Sized,
    F: FnOnce(&RequestContext) -> Result<T, TwirkError>,
{
    let result = hooks
        .request_received(ctx)
        .and_then(|()| {
            ctx.set_method(method);
            hooks.request_routed(ctx)
        })
        .and_then(|()| handler(ctx));

    match result {
        Ok(value) => {
            ctx.set_status(200);
            hooks.response_prepared(ctx);
            hooks.response_sent(ctx);
            Ok(value)
        }
        Err(err) => {
            ctx.set_error(&err);
            debug!(
                method,
                code = %err.code(),
                status = err.http_status(),
                "twirk call failed"
            );
            hooks.error(ctx, &err);
            hooks.response_sent(ctx);
            Err(err)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
