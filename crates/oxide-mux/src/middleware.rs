//! Handler contract and middleware composition.

use std::sync::Arc;

use tracing::info;

use crate::request::Request;
use crate::response::Response;

/// A request handler: writes into the response sink, returns nothing.
pub type Handler = Arc<dyn Fn(&mut Response, &Request) + Send + Sync>;

/// A middleware wraps a handler into a new handler.
///
/// Code before the call to the inner handler runs on the way in, code after
/// it on the way out.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use oxide_mux::{Handler, Middleware, Request, Response};
///
/// let powered_by: Middleware = Arc::new(|next: Handler| -> Handler {
///     Arc::new(move |res: &mut Response, req: &Request| {
///         next(res, req);
///         res.set_header("X-Powered-By", "oxide-mux");
///     })
/// });
/// ```
pub type Middleware = Arc<dyn Fn(Handler) -> Handler + Send + Sync>;

/// Boxes a closure into a [`Handler`].
pub fn handler_fn<F>(f: F) -> Handler
where
    F: Fn(&mut Response, &Request) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Boxes a closure into a [`Middleware`].
pub fn middleware_fn<F>(f: F) -> Middleware
where
    F: Fn(Handler) -> Handler + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Wraps `handler` in `chain`.
///
/// Wraps are applied last to first, so `chain[0]` ends up outermost: its
/// "before" code runs first and its "after" code runs last.
pub fn wrap(handler: Handler, chain: &[Middleware]) -> Handler {
    chain.iter().rev().fold(handler, |inner, mw| mw(inner))
}

/// Middleware that logs one line per request once the handler returns.
pub fn trace_requests() -> Middleware {
    middleware_fn(|next: Handler| -> Handler {
        Arc::new(move |res: &mut Response, req: &Request| {
            next(res, req);
            info!(method = %req.method, path = %req.path, status = res.status, "request served");
        })
    })
}

/// Middleware that sets a response header before the inner handler runs.
///
/// The inner handler may still override it.
pub fn set_header(name: impl Into<String>, value: impl Into<String>) -> Middleware {
    let name: Arc<str> = Arc::from(name.into());
    let value: Arc<str> = Arc::from(value.into());
    middleware_fn(move |next: Handler| -> Handler {
        let name = Arc::clone(&name);
        let value = Arc::clone(&value);
        Arc::new(move |res: &mut Response, req: &Request| {
            res.set_header(&*name, &*value);
            next(res, req);
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn recording(log: &Arc<Mutex<Vec<String>>>, tag: &'static str) -> Middleware {
        let log = Arc::clone(log);
        middleware_fn(move |next: Handler| -> Handler {
            let log = Arc::clone(&log);
            Arc::new(move |res: &mut Response, req: &Request| {
                log.lock().unwrap().push(format!("{tag}:before"));
                next(res, req);
                log.lock().unwrap().push(format!("{tag}:after"));
            })
        })
    }

    #[test]
    fn test_wrap_is_onion_ordered() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let inner_log = Arc::clone(&log);
        let handler = handler_fn(move |_, _| inner_log.lock().unwrap().push("handler".into()));

        let chain = vec![recording(&log, "a"), recording(&log, "b")];
        let wrapped = wrap(handler, &chain);
        wrapped(&mut Response::ok(), &Request::get("/"));

        assert_eq!(
            *log.lock().unwrap(),
            vec!["a:before", "b:before", "handler", "b:after", "a:after"]
        );
    }

    #[test]
    fn test_wrap_empty_chain() {
        let handler = handler_fn(|res, _| res.status = 201);
        let wrapped = wrap(handler, &[]);
        let mut res = Response::ok();
        wrapped(&mut res, &Request::get("/"));
        assert_eq!(res.status, 201);
    }

    #[test]
    fn test_set_header_can_be_overridden() {
        let chain = vec![set_header("Cache-Control", "no-store")];

        let plain = wrap(handler_fn(|_, _| {}), &chain);
        let mut res = Response::ok();
        plain(&mut res, &Request::get("/"));
        assert_eq!(res.get_header("cache-control"), Some("no-store"));

        let overriding = wrap(
            handler_fn(|res, _| res.set_header("Cache-Control", "max-age=60")),
            &chain,
        );
        let mut res = Response::ok();
        overriding(&mut res, &Request::get("/"));
        assert_eq!(res.get_header("Cache-Control"), Some("max-age=60"));
    }
}
