use std::collections::HashMap;

use thiserror::Error;

use crate::common::method::Method;
use crate::common::request::Request;
use crate::common::response::Response;
use crate::common::status;

/// A function that turns a request into a response.
pub type Handler = Box<dyn Fn(&Request) -> Response + 'static + Send + Sync>;

/// Error for when no handler is registered for a request.
#[derive(Debug, Error, PartialEq, Eq, Clone, Copy)]
pub enum RouteError {
    /// No handler is registered for the method on any path.
    #[error("method not allowed")]
    MethodNotAllowed,
    /// The method has handlers, but not for this path.
    #[error("not found")]
    NotFound,
}

/// A router that calls handlers registered on an exact method and path.
#[derive(Default)]
pub struct Router {
    handlers: HashMap<Method, HashMap<String, Handler>>,
}

impl Router {
    /// Creates a new empty router.
    pub fn new() -> Router {
        Router { handlers: HashMap::new() }
    }

    /// Calls the given handler on requests with the given method and a path equal to the given path.
    /// Replaces any handler already registered for the same method and path.
    pub fn on(&mut self, method: Method, path: &str, handler: impl Fn(&Request) -> Response + 'static + Send + Sync) {
        self.handlers.entry(method).or_default().insert(path.to_string(), Box::new(handler));
    }

    pub fn get(&mut self, path: &str, handler: impl Fn(&Request) -> Response + 'static + Send + Sync) {
        self.on(Method::GET, path, handler)
    }

    pub fn post(&mut self, path: &str, handler: impl Fn(&Request) -> Response + 'static + Send + Sync) {
        self.on(Method::POST, path, handler)
    }

    pub fn put(&mut self, path: &str, handler: impl Fn(&Request) -> Response + 'static + Send + Sync) {
        self.on(Method::PUT, path, handler)
    }

    pub fn patch(&mut self, path: &str, handler: impl Fn(&Request) -> Response + 'static + Send + Sync) {
        self.on(Method::PATCH, path, handler)
    }

    pub fn delete(&mut self, path: &str, handler: impl Fn(&Request) -> Response + 'static + Send + Sync) {
        self.on(Method::DELETE, path, handler)
    }

    pub fn options(&mut self, path: &str, handler: impl Fn(&Request) -> Response + 'static + Send + Sync) {
        self.on(Method::OPTIONS, path, handler)
    }

    pub fn head(&mut self, path: &str, handler: impl Fn(&Request) -> Response + 'static + Send + Sync) {
        self.on(Method::HEAD, path, handler)
    }

    /// Finds the handler for the given method and path.
    pub fn resolve(&self, method: Method, path: &str) -> Result<&Handler, RouteError> {
        self.handlers.get(&method)
            .ok_or(RouteError::MethodNotAllowed)?
            .get(path)
            .ok_or(RouteError::NotFound)
    }

    /// Gets the response from the handler for the given request.
    /// If there is no handler, the response is a 405 or 404 with an empty body.
    pub fn respond(&self, request: &Request) -> Response {
        match self.resolve(request.method, &request.path) {
            Ok(handler) => handler(request),
            Err(RouteError::MethodNotAllowed) => status::METHOD_NOT_ALLOWED.into(),
            Err(RouteError::NotFound) => status::NOT_FOUND.into()
        }
    }
}
