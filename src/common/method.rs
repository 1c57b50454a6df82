use std::fmt::{Display, Formatter};

/// An HTTP method.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    /// GET method.
    GET,
    /// POST method.
    POST,
    /// PUT method.
    PUT,
    /// PATCH method.
    PATCH,
    /// DELETE method.
    DELETE,
    /// OPTIONS method.
    OPTIONS,
    /// HEAD method.
    HEAD,
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl Method {
    /// Converts the given string to a method. Methods are case sensitive. Returns None if no Method matches.
    pub fn try_from_str(s: &str) -> Option<Method> {
        match s {
            "GET" => Some(Method::GET),
            "POST" => Some(Method::POST),
            "PUT" => Some(Method::PUT),
            "PATCH" => Some(Method::PATCH),
            "DELETE" => Some(Method::DELETE),
            "OPTIONS" => Some(Method::OPTIONS),
            "HEAD" => Some(Method::HEAD),
            _ => None
        }
    }
}
