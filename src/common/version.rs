use std::fmt::{Display, Formatter};

/// An HTTP version accepted on the request line. Responses are always written as HTTP/1.0.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Version {
    /// "HTTP/1.0"
    Http10,
    /// "HTTP/1.1"
    Http11,
}

impl Version {
    /// Gets the version for the given raw version token, or None if it isn't supported.
    pub fn try_from_str(raw: &str) -> Option<Version> {
        match raw {
            "HTTP/1.0" => Some(Version::Http10),
            "HTTP/1.1" => Some(Version::Http11),
            _ => None
        }
    }

    /// The version token as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Version::Http10 => "HTTP/1.0",
            Version::Http11 => "HTTP/1.1",
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
