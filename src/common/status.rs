use std::fmt::{Display, Formatter};

/// An HTTP status.
#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub struct Status {
    /// The status code.
    pub code: u16,
    /// The reason for the status.
    pub reason: &'static str,
}

impl Display for Status {
    /// Formats the status as `<code> <reason>`, which is also the default response body.
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.code, self.reason)
    }
}

macro_rules! status_codes {
    (
        $(
            $(#[$docs:meta])*
            ($name:ident, $num:literal, $phrase:expr);
        )+
    ) => {
        $(
            $(#[$docs])*
            pub const $name: Status = Status { code: $num, reason: $phrase };
        )+

        impl Status {
            /// Gets the status from the given status code.
            pub fn from_code(code: u16) -> Option<Status> {
                match code {
                    $(
                    $num => Some($name),
                    )+
                    _ => None
                }
            }
        }
    }
}

status_codes! {
    (OK, 200, "OK");
    (CREATED, 201, "Created");
    (ACCEPTED, 202, "Accepted");
    (NO_CONTENT, 204, "No Content");
    (MOVED_PERMANENTLY, 301, "Moved Permanently");
    (FOUND, 302, "Found");
    (SEE_OTHER, 303, "See Other");
    (NOT_MODIFIED, 304, "Not Modified");
    (TEMPORARY_REDIRECT, 307, "Temporary Redirect");
    (PERMANENT_REDIRECT, 308, "Permanent Redirect");
    (BAD_REQUEST, 400, "Bad Request");
    (UNAUTHORIZED, 401, "Unauthorized");
    (FORBIDDEN, 403, "Forbidden");
    (NOT_FOUND, 404, "Not Found");
    (METHOD_NOT_ALLOWED, 405, "Method Not Allowed");
    (NOT_ACCEPTABLE, 406, "Not Acceptable");
    (REQUEST_TIMEOUT, 408, "Request Timeout");
    (CONFLICT, 409, "Conflict");
    (GONE, 410, "Gone");
    (LENGTH_REQUIRED, 411, "Length Required");
    (PAYLOAD_TOO_LARGE, 413, "Payload Too Large");
    (URI_TOO_LONG, 414, "URI Too Long");
    (UNSUPPORTED_MEDIA_TYPE, 415, "Unsupported Media Type");
    (IM_A_TEAPOT, 418, "I'm a teapot");
    (UNPROCESSABLE_ENTITY, 422, "Unprocessable Entity");
    (TOO_MANY_REQUESTS, 429, "Too Many Requests");
    (REQUEST_HEADER_FIELDS_TOO_LARGE, 431, "Request Header Fields Too Large");
    (INTERNAL_SERVER_ERROR, 500, "Internal Server Error");
    (NOT_IMPLEMENTED, 501, "Not Implemented");
    (BAD_GATEWAY, 502, "Bad Gateway");
    (SERVICE_UNAVAILABLE, 503, "Service Unavailable");
    (GATEWAY_TIMEOUT, 504, "Gateway Timeout");
    (HTTP_VERSION_NOT_SUPPORTED, 505, "HTTP Version Not Supported");
}
