//! Minimal sprout example: JSON user endpoints, a route group and scoped
//! middleware.
//!
//! Run with:
//!   RUST_LOG=info DEBUG_MODE=true cargo run --example basic
//!
//! Try:
//!   curl http://localhost:3000/users/42
//!   curl http://localhost:3000/users/active
//!   curl -X POST http://localhost:3000/users -d '{"name":"alice"}'
//!   curl -H 'authorization: secret' http://localhost:3000/admin/stats
//!   curl 'http://localhost:3000/search?q=rust&page=2'

use std::sync::Arc;

use http::{HeaderValue, StatusCode};
use serde::Deserialize;
use serde_json::json;
use sprout::middleware::{self, middleware_fn};
use sprout::{App, Handler, HttpError, Options, Server, handler_fn};

#[derive(Deserialize)]
struct CreateUser {
    name: String,
}

#[tokio::main]
async fn main() -> Result<(), sprout::Error> {
    tracing_subscriber::fmt::init();

    let mut app = App::with_options(Options::from_env());
    app.register(middleware::trace());

    app.get("/users/:id", handler_fn(|ctx| Box::pin(async move {
        let id = ctx.path_param("id").unwrap_or_default().to_owned();
        ctx.json(StatusCode::OK, &json!({ "id": id, "name": "alice" }))
    })))?;

    // Static segments win over `:id`.
    app.get("/users/active", handler_fn(|ctx| Box::pin(async move {
        ctx.json(StatusCode::OK, &json!([{ "id": "1", "name": "alice" }]))
    })))?;

    app.post("/users", handler_fn(|ctx| Box::pin(async move {
        let input: CreateUser = serde_json::from_slice(ctx.body())
            .map_err(|e| HttpError::with_message(StatusCode::BAD_REQUEST, "invalid body").with_internal(e))?;
        ctx.set_response_header("location", HeaderValue::from_static("/users/99"));
        ctx.json(StatusCode::CREATED, &json!({ "id": "99", "name": input.name }))
    })))?;

    app.get("/search", handler_fn(|ctx| Box::pin(async move {
        let params = ctx.params().clone();
        ctx.json(StatusCode::OK, &params)
    })))?;

    app.leaf("/admin", |admin| {
        admin.register(require_token("secret"));
        admin.get("/stats", handler_fn(|ctx| Box::pin(async move {
            let id = ctx.request_id();
            ctx.json(StatusCode::OK, &json!({ "requests": 1, "request_id": id }))
        })))
    })?;

    Server::bind("0.0.0.0:3000")?.serve(app).await
}

/// Rejects requests whose `authorization` header is not `token`.
fn require_token(token: &'static str) -> impl middleware::Middleware {
    middleware_fn(move |next| {
        handler_fn(move |ctx| {
            let next = Arc::clone(&next);
            Box::pin(async move {
                if ctx.header("authorization") != Some(token) {
                    return Err(HttpError::new(StatusCode::UNAUTHORIZED).into());
                }
                next.call(ctx).await
            })
        })
        .into_boxed_handler()
    })
}
