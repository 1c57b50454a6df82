use std::collections::HashMap;

use thiserror::Error;

use crate::common::request::{Body, Request};

/// MIME type of JSON bodies.
pub const APPLICATION_JSON: &str = "application/json";

/// MIME type of URL encoded form bodies.
pub const FORM_URLENCODED: &str = "application/x-www-form-urlencoded";

/// Error for when a raw body can't be turned into a typed body.
#[derive(Debug, Error)]
pub enum BodyParseError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("form pair {0:?} has no '='")]
    MalformedPair(String),
}

/// Turns a raw text body into a typed body.
pub trait BodyParser: Send + Sync {
    fn parse(&self, raw: &str) -> Result<Body, BodyParseError>;
}

/// Parses JSON bodies into structured values.
pub struct JsonBodyParser;

impl BodyParser for JsonBodyParser {
    fn parse(&self, raw: &str) -> Result<Body, BodyParseError> {
        Ok(Body::Structured(serde_json::from_str(raw)?))
    }
}

/// Parses `a=1&b=2` bodies into form fields. Keys and values are percent decoded, with `+` as a space.
pub struct FormBodyParser;

impl BodyParser for FormBodyParser {
    fn parse(&self, raw: &str) -> Result<Body, BodyParseError> {
        if let Some(pair) = raw.split('&').find(|pair| !pair.is_empty() && !pair.contains('=')) {
            return Err(BodyParseError::MalformedPair(pair.to_string()));
        }

        let fields = form_urlencoded::parse(raw.as_bytes())
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        Ok(Body::FormFields(fields))
    }
}

/// Body parsers by the content type they handle.
pub struct BodyParserRegistry {
    parsers: HashMap<String, Box<dyn BodyParser>>,
}

impl BodyParserRegistry {
    /// Creates a registry without any parsers.
    pub fn new() -> BodyParserRegistry {
        BodyParserRegistry { parsers: HashMap::new() }
    }

    /// Creates a registry with the JSON and URL encoded form parsers.
    pub fn with_defaults() -> BodyParserRegistry {
        let mut registry = BodyParserRegistry::new();
        registry.register(APPLICATION_JSON, JsonBodyParser);
        registry.register(FORM_URLENCODED, FormBodyParser);
        registry
    }

    /// Sets the parser for the given content type, replacing any parser already set for it.
    pub fn register(&mut self, content_type: impl Into<String>, parser: impl BodyParser + 'static) {
        self.parsers.insert(content_type.into(), Box::new(parser));
    }

    pub fn get(&self, content_type: &str) -> Option<&dyn BodyParser> {
        self.parsers.get(content_type).map(|parser| parser.as_ref())
    }

    /// Replaces a raw request body with the typed body from the parser registered for the request's
    /// content type. The content type must match a registered one exactly. Requests with no raw body
    /// or an unknown content type are left alone, and so is the body if the parser fails.
    pub fn apply(&self, request: &mut Request) -> Result<(), BodyParseError> {
        let parser = match request.content_type().and_then(|content_type| self.get(content_type)) {
            Some(parser) => parser,
            None => return Ok(())
        };

        if let Body::Raw(raw) = &request.body {
            request.body = parser.parse(raw)?;
        }

        Ok(())
    }
}

impl Default for BodyParserRegistry {
    fn default() -> Self {
        BodyParserRegistry::with_defaults()
    }
}
