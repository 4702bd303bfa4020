use std::sync::{Arc, Mutex};

use http::StatusCode;
use sprout::middleware::{Middleware, middleware_fn};
use sprout::{
    App, BoxError, BoxedHandler, Handler, HttpError, Method, Options, REQUEST_ID_HEADER, handler_fn,
};

type Trail = Arc<Mutex<Vec<&'static str>>>;

fn tag(name: &'static str, trail: &Trail) -> impl Middleware {
    let trail = Arc::clone(trail);
    middleware_fn(move |next: BoxedHandler| {
        let trail = Arc::clone(&trail);
        handler_fn(move |ctx| {
            let next = Arc::clone(&next);
            let trail = Arc::clone(&trail);
            Box::pin(async move {
                trail.lock().unwrap().push(name);
                next.call(ctx).await
            })
        })
        .into_boxed_handler()
    })
}

fn echo_id() -> impl Handler {
    handler_fn(|ctx| {
        Box::pin(async move {
            let id = ctx.path_param("id").unwrap_or_default().to_owned();
            ctx.text(StatusCode::OK, id)
        })
    })
}

fn fixed(body: &'static str) -> impl Handler {
    handler_fn(move |ctx| Box::pin(async move { ctx.text(StatusCode::OK, body) }))
}

#[tokio::test]
async fn param_route_and_sibling_are_distinct() {
    let mut app = App::new();
    app.get("/users/:id", echo_id()).unwrap();
    app.get("/users", fixed("list")).unwrap();

    let res = app.play(Method::Get, "/users/7", "").await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.text(), "7");

    let res = app.play(Method::Get, "/users", "").await.unwrap();
    assert_eq!(res.text(), "list");
}

#[tokio::test]
async fn static_segment_beats_param() {
    let mut app = App::new();
    app.get("/users/:id", echo_id()).unwrap();
    app.get("/users/active", fixed("active")).unwrap();

    assert_eq!(app.play(Method::Get, "/users/active", "").await.unwrap().text(), "active");
    assert_eq!(app.play(Method::Get, "/users/42", "").await.unwrap().text(), "42");
}

#[tokio::test]
async fn percent_encoded_paths_are_decoded_before_routing() {
    let mut app = App::new();
    app.get(
        "/users/:name",
        handler_fn(|ctx| {
            Box::pin(async move {
                let name = ctx.path_param("name").unwrap_or_default().to_owned();
                ctx.text(StatusCode::OK, name)
            })
        }),
    )
    .unwrap();
    app.get("/users/active", fixed("active")).unwrap();

    assert_eq!(app.play(Method::Get, "/users/john%20doe", "").await.unwrap().text(), "john doe");
    assert_eq!(app.play(Method::Get, "/users/act%69ve", "").await.unwrap().text(), "active");
}

#[tokio::test]
async fn trailing_slash_resolves_both_ways() {
    let mut app = App::new();
    app.get("/users/", fixed("a")).unwrap();
    app.get("/posts", fixed("b")).unwrap();

    assert_eq!(app.play(Method::Get, "/users", "").await.unwrap().text(), "a");
    assert_eq!(app.play(Method::Get, "/posts/", "").await.unwrap().text(), "b");
}

#[tokio::test]
async fn middleware_runs_root_to_leaf_then_handler() {
    let trail = Trail::default();
    let mut app = App::new();
    app.register(tag("a", &trail));
    app.combine("/users", tag("b", &trail));
    app.combine("/users/hello", tag("c", &trail));

    let recorded = Arc::clone(&trail);
    app.get(
        "/users/hello/x",
        handler_fn(move |ctx| {
            let recorded = Arc::clone(&recorded);
            Box::pin(async move {
                recorded.lock().unwrap().push("handler");
                ctx.no_content()
            })
        }),
    )
    .unwrap();
    app.get("/other", fixed("other")).unwrap();

    let res = app.play(Method::Get, "/users/hello/x", "").await.unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(*trail.lock().unwrap(), ["a", "b", "c", "handler"]);

    trail.lock().unwrap().clear();
    app.play(Method::Get, "/other", "").await.unwrap();
    assert_eq!(*trail.lock().unwrap(), ["a"]);
}

#[tokio::test]
async fn not_found_skips_middleware() {
    let trail = Trail::default();
    let mut app = App::new();
    app.register(tag("global", &trail));
    app.get("/users/:id/name", echo_id()).unwrap();

    for path in ["/nowhere", "/users/1/age", "/users"] {
        let res = app.play(Method::Get, path, "").await.unwrap();
        assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
    }
    let res = app.play(Method::Post, "/users/1/name", "").await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    assert!(trail.lock().unwrap().is_empty());
}

#[tokio::test]
async fn query_params_are_bounded() {
    let options = Options { max_query_params: 2, ..Options::default() };
    let mut app = App::with_options(options);
    app.get(
        "/search",
        handler_fn(|ctx| {
            Box::pin(async move {
                let seen: Vec<_> = ["a", "b", "c"]
                    .iter()
                    .map(|k| ctx.query_param(k).unwrap_or("-").to_owned())
                    .collect();
                ctx.text(StatusCode::OK, seen.join(","))
            })
        }),
    )
    .unwrap();

    let res = app.play(Method::Get, "/search?a=1&b=2&c=3", "").await.unwrap();
    assert_eq!(res.text(), "1,2,-");
}

#[tokio::test]
async fn handler_errors_go_through_the_error_handler() {
    let mut app = App::new();
    app.get(
        "/fail",
        handler_fn(|_ctx| {
            Box::pin(async move {
                Err::<(), BoxError>(HttpError::with_message(StatusCode::BAD_REQUEST, "bad input").into())
            })
        }),
    )
    .unwrap();
    app.get("/boom", handler_fn(|_ctx| Box::pin(async move { Err::<(), BoxError>("boom".into()) })))
        .unwrap();

    let res = app.play(Method::Get, "/fail", "").await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.text(), r#"{"message":"bad input"}"#);

    let res = app.play(Method::Get, "/boom", "").await.unwrap();
    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(res.text(), r#"{"message":"Internal Server Error"}"#);
}

#[tokio::test]
async fn custom_error_handler_replaces_default() {
    let mut app = App::new();
    app.set_error_handler(|err, ctx| {
        let _ = ctx.text(StatusCode::SERVICE_UNAVAILABLE, format!("custom: {err}"));
    });
    app.get("/boom", handler_fn(|_ctx| Box::pin(async move { Err::<(), BoxError>("down".into()) })))
        .unwrap();

    let res = app.play(Method::Get, "/boom", "").await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(res.text(), "custom: down");
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let mut app = App::new();
    app.get(
        "/id",
        handler_fn(|ctx| {
            Box::pin(async move {
                let id = ctx.request_id();
                ctx.text(StatusCode::OK, id)
            })
        }),
    )
    .unwrap();

    let request = http::Request::builder()
        .uri("/id")
        .header(REQUEST_ID_HEADER, "req-42")
        .body(bytes::Bytes::new())
        .unwrap();
    let res = app.dispatch(request, None).await;
    assert_eq!(res.header(REQUEST_ID_HEADER), Some("req-42"));
    assert_eq!(res.text(), "req-42");

    let res = app.play(Method::Get, "/id", "").await.unwrap();
    let generated = res.header(REQUEST_ID_HEADER).unwrap().to_owned();
    assert_eq!(generated.len(), 36);
    assert_eq!(res.text(), generated);
}

#[tokio::test]
async fn body_reaches_handler() {
    let mut app = App::new();
    app.post(
        "/echo",
        handler_fn(|ctx| {
            Box::pin(async move {
                let body = String::from_utf8_lossy(ctx.body()).into_owned();
                ctx.text(StatusCode::CREATED, body)
            })
        }),
    )
    .unwrap();

    let res = app.play(Method::Post, "/echo", "hello").await.unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    assert_eq!(res.text(), "hello");
}

#[tokio::test]
async fn leaf_and_merge_serve_end_to_end() {
    let trail = Trail::default();
    let mut api = App::new();
    api.leaf("/api/v1", |v1| {
        v1.register(tag("v1", &trail));
        v1.get("/users/:id", echo_id())
    })
    .unwrap();

    let mut app = App::new();
    app.merge(api).unwrap();

    let res = app.play(Method::Get, "/api/v1/users/5", "").await.unwrap();
    assert_eq!(res.text(), "5");
    assert_eq!(*trail.lock().unwrap(), ["v1"]);
}

#[tokio::test]
async fn concurrent_requests_do_not_leak_state() {
    let mut app = App::new();
    app.get("/users/:id", echo_id()).unwrap();
    let app = Arc::new(app);

    let tasks: Vec<_> = (0..32)
        .map(|i| {
            let app = Arc::clone(&app);
            tokio::spawn(async move {
                let res = app.play(Method::Get, &format!("/users/{i}"), "").await.unwrap();
                assert_eq!(res.text(), i.to_string());
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }
}
