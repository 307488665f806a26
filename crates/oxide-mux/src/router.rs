//! Route table, registration and dispatch.

use std::sync::Arc;

use tracing::debug;

use crate::config::MuxConfig;
use crate::error::Result;
use crate::middleware::{handler_fn, wrap, Handler, Middleware};
use crate::path::{split_path, Pattern};
use crate::request::{Method, Params, Request};
use crate::response::Response;

/// Name of the header carrying the allowed methods.
pub const ALLOW_HEADER: &str = "Allow";

/// A single route: one method bound to one pattern.
#[derive(Clone)]
pub struct Route {
    /// Uppercased HTTP method.
    pub method: String,
    /// Compiled pattern, shared by every method registered with it.
    pub pattern: Arc<Pattern>,
    /// Handler wrapped in the middleware chain active at registration.
    pub handler: Handler,
}

impl std::fmt::Debug for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("pattern", &self.pattern.as_str())
            .finish_non_exhaustive()
    }
}

/// Methods accepted by a path, deduplicated in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowSet {
    methods: Vec<String>,
}

impl AllowSet {
    /// Adds a method unless already present.
    pub fn insert(&mut self, method: &str) {
        if !self.contains(method) {
            self.methods.push(method.to_string());
        }
    }

    /// Returns whether a method is present.
    pub fn contains(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    /// Returns whether no method was recorded.
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// Returns the recorded methods.
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Formats the `Allow` header value: the recorded methods joined with
    /// `", "`, with `OPTIONS` always appended last.
    pub fn header_value(&self) -> String {
        let mut parts: Vec<&str> = self.methods.iter().map(String::as_str).collect();
        parts.push(Method::Options.as_str());
        parts.join(", ")
    }
}

/// The result of resolving a method and path against the route table.
#[derive(Debug)]
pub enum Outcome<'a> {
    /// A route matched both path and method.
    Matched {
        /// The matched route.
        route: &'a Route,
        /// Parameters bound by its pattern.
        params: Params,
    },
    /// The path is known and the request is an OPTIONS request.
    Options {
        /// Methods registered for the path.
        allow: AllowSet,
    },
    /// The path is known but not under the requested method.
    MethodNotAllowed {
        /// Methods registered for the path.
        allow: AllowSet,
    },
    /// No route matched the path under any method.
    NotFound,
}

/// The request multiplexer.
///
/// Routes are scanned in registration order. A route is wrapped in the
/// middleware chain that is active when it is registered; the fallback
/// handlers are wrapped in the chain of the mux that serves the request.
///
/// # Example
///
/// ```
/// use oxide_mux::{Mux, Request, Response};
///
/// let mut mux = Mux::new();
/// mux.get("/users/:id|[0-9]+", |res: &mut Response, req: &Request| {
///     *res = Response::text(format!("user {}", req.param("id").unwrap_or_default()));
/// });
///
/// let res = mux.handle(Request::get("/users/42"));
/// assert_eq!(res.body_string().as_deref(), Some("user 42"));
///
/// let res = mux.handle(Request::delete("/users/42"));
/// assert_eq!(res.status, 405);
/// assert_eq!(res.get_header("Allow"), Some("GET, HEAD, OPTIONS"));
/// ```
#[derive(Clone)]
pub struct Mux {
    config: MuxConfig,
    routes: Vec<Route>,
    middleware: Vec<Middleware>,
    not_found: Handler,
    method_not_allowed: Handler,
    options: Handler,
}

impl std::fmt::Debug for Mux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mux")
            .field("config", &self.config)
            .field("routes", &self.routes)
            .field("middleware", &self.middleware.len())
            .finish_non_exhaustive()
    }
}

impl Default for Mux {
    fn default() -> Self {
        Self::new()
    }
}

impl Mux {
    /// Creates an empty mux with the default configuration.
    pub fn new() -> Self {
        Self::with_config(MuxConfig::default())
    }

    /// Creates an empty mux with the given configuration.
    pub fn with_config(config: MuxConfig) -> Self {
        Self {
            config,
            routes: Vec::new(),
            middleware: Vec::new(),
            not_found: handler_fn(|res, _| res.replace(Response::not_found())),
            method_not_allowed: handler_fn(|res, _| res.replace(Response::method_not_allowed())),
            options: handler_fn(|res, _| res.replace(Response::no_content())),
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &MuxConfig {
        &self.config
    }

    /// Registers `handler` for `pattern` under each of `methods`.
    ///
    /// Methods are uppercased. GET implies HEAD unless `auto_head` is off,
    /// and an empty method list means every method in `default_methods`.
    /// Every method gets its own [`Route`]; they share the compiled pattern
    /// and the wrapped handler.
    pub fn try_route<F>(&mut self, pattern: &str, methods: &[&str], handler: F) -> Result<&mut Self>
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.try_route_handler(pattern, methods, handler_fn(handler))
    }

    /// Like [`Mux::try_route`], for an already boxed handler.
    pub fn try_route_handler(
        &mut self,
        pattern: &str,
        methods: &[&str],
        handler: Handler,
    ) -> Result<&mut Self> {
        let pattern = Arc::new(Pattern::parse(pattern)?);
        let handler = wrap(handler, &self.middleware);

        for method in self.normalize_methods(methods) {
            debug!(%method, pattern = %pattern, "registering route");
            self.routes.push(Route {
                method,
                pattern: Arc::clone(&pattern),
                handler: Arc::clone(&handler),
            });
        }

        Ok(self)
    }

    fn normalize_methods(&self, methods: &[&str]) -> Vec<String> {
        let mut normalized: Vec<String> = Vec::with_capacity(methods.len() + 1);
        for method in methods {
            let method = method.to_uppercase();
            if !normalized.contains(&method) {
                normalized.push(method);
            }
        }

        let has = |m: Method| normalized.iter().any(|n| n == m.as_str());
        if self.config.auto_head && has(Method::Get) && !has(Method::Head) {
            normalized.push(Method::Head.as_str().to_string());
        }

        if normalized.is_empty() {
            normalized = self
                .config
                .default_methods
                .iter()
                .map(|m| m.to_uppercase())
                .collect();
        }

        normalized
    }

    /// Registers a route, panicking if the pattern is malformed.
    ///
    /// A bad pattern is a programming error; use [`Mux::try_route`] to
    /// handle it instead.
    pub fn route<F>(&mut self, pattern: &str, methods: &[&str], handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        if let Err(err) = self.try_route(pattern, methods, handler) {
            panic!("{err}");
        }
        self
    }

    /// Adds a GET route (and HEAD, see [`MuxConfig::auto_head`]).
    pub fn get<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(pattern, &[Method::Get.as_str()], handler)
    }

    /// Adds a HEAD route.
    pub fn head<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(pattern, &[Method::Head.as_str()], handler)
    }

    /// Adds a POST route.
    pub fn post<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(pattern, &[Method::Post.as_str()], handler)
    }

    /// Adds a PUT route.
    pub fn put<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(pattern, &[Method::Put.as_str()], handler)
    }

    /// Adds a PATCH route.
    pub fn patch<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(pattern, &[Method::Patch.as_str()], handler)
    }

    /// Adds a DELETE route.
    pub fn delete<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(pattern, &[Method::Delete.as_str()], handler)
    }

    /// Adds an explicit OPTIONS route, taking precedence over the automatic
    /// options handler for matching paths.
    pub fn options<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(pattern, &[Method::Options.as_str()], handler)
    }

    /// Adds a route answering every default method.
    pub fn any<F>(&mut self, pattern: &str, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.route(pattern, &[], handler)
    }

    /// Appends a middleware to the chain.
    ///
    /// It wraps routes registered after this call and every fallback.
    /// The first middleware added is the outermost.
    pub fn middleware(&mut self, mw: Middleware) -> &mut Self {
        self.middleware.push(mw);
        self
    }

    /// Registers routes in a scope with its own middleware chain.
    ///
    /// The scope starts with a copy of this mux's middleware and fallbacks;
    /// middleware added inside it applies only to routes added inside it.
    /// The scope's routes are appended to this mux's table when `f`
    /// returns, keeping registration order.
    ///
    /// ```
    /// use oxide_mux::{middleware, Mux, Request, Response};
    ///
    /// let mut mux = Mux::new();
    /// mux.get("/", |_: &mut Response, _: &Request| {});
    /// mux.group(|admin| {
    ///     admin.middleware(middleware::set_header("X-Scope", "admin"));
    ///     admin.get("/admin", |_: &mut Response, _: &Request| {});
    /// });
    ///
    /// assert_eq!(mux.handle(Request::get("/admin")).get_header("X-Scope"), Some("admin"));
    /// assert_eq!(mux.handle(Request::get("/")).get_header("X-Scope"), None);
    /// ```
    pub fn group<F>(&mut self, f: F) -> &mut Self
    where
        F: FnOnce(&mut Self),
    {
        let mut scope = Self {
            config: self.config.clone(),
            routes: Vec::new(),
            middleware: self.middleware.clone(),
            not_found: Arc::clone(&self.not_found),
            method_not_allowed: Arc::clone(&self.method_not_allowed),
            options: Arc::clone(&self.options),
        };
        f(&mut scope);
        self.routes.append(&mut scope.routes);
        self
    }

    /// Replaces the handler invoked when no route matches the path.
    pub fn not_found<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.not_found = handler_fn(handler);
        self
    }

    /// Replaces the handler invoked when the path matches but the method
    /// does not. The `Allow` header is already set when it runs.
    pub fn method_not_allowed<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.method_not_allowed = handler_fn(handler);
        self
    }

    /// Replaces the handler answering automatic OPTIONS requests. The
    /// `Allow` header is already set when it runs.
    pub fn options_handler<F>(&mut self, handler: F) -> &mut Self
    where
        F: Fn(&mut Response, &Request) + Send + Sync + 'static,
    {
        self.options = handler_fn(handler);
        self
    }

    /// Returns the registered routes in registration order.
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    /// Returns the number of registered routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Returns whether no route is registered.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Decides how a request is answered, without invoking anything.
    ///
    /// The first route matching both path and method wins. Routes whose
    /// pattern matches under another method are collected into the allow
    /// set; the scan continues past them so a later route with the right
    /// method still wins.
    pub fn resolve(&self, method: &str, path: &str) -> Outcome<'_> {
        let segments = split_path(path);
        let mut allow = AllowSet::default();

        for route in &self.routes {
            let Some(params) = route.pattern.match_segments(&segments) else {
                continue;
            };
            if route.method == method {
                return Outcome::Matched { route, params };
            }
            allow.insert(&route.method);
        }

        if allow.is_empty() {
            Outcome::NotFound
        } else if self.config.auto_options && method == Method::Options.as_str() {
            Outcome::Options { allow }
        } else {
            Outcome::MethodNotAllowed { allow }
        }
    }

    /// Serves one request: resolves it, binds its parameters and invokes
    /// the chosen handler.
    ///
    /// Parameters left on `req` from an earlier dispatch are discarded.
    pub fn serve(&self, res: &mut Response, req: &mut Request) {
        req.params = Params::new();

        let handler = match self.resolve(&req.method, &req.path) {
            Outcome::Matched { route, params } => {
                debug!(method = %req.method, path = %req.path, pattern = %route.pattern, "route matched");
                req.params = params;
                Arc::clone(&route.handler)
            }
            Outcome::Options { allow } => {
                let allow = allow.header_value();
                debug!(path = %req.path, %allow, "answering options");
                res.set_header(ALLOW_HEADER, allow);
                wrap(Arc::clone(&self.options), &self.middleware)
            }
            Outcome::MethodNotAllowed { allow } => {
                let allow = allow.header_value();
                debug!(method = %req.method, path = %req.path, %allow, "method not allowed");
                res.set_header(ALLOW_HEADER, allow);
                wrap(Arc::clone(&self.method_not_allowed), &self.middleware)
            }
            Outcome::NotFound => {
                debug!(method = %req.method, path = %req.path, "no route matched");
                wrap(Arc::clone(&self.not_found), &self.middleware)
            }
        };

        handler(res, req);
    }

    /// Serves a request into a fresh `200 OK` response and returns it.
    pub fn handle(&self, mut request: Request) -> Response {
        let mut response = Response::ok();
        self.serve(&mut response, &mut request);
        response
    }
}
