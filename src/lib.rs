/// Command-line argument parser
pub mod args;
/// HTTP data types.
pub mod common;
/// Components for running an HTTP server and handling requests.
pub mod server;

/// Utility components.
pub mod util;

/// Components for parsing HTTP requests.
pub mod parse;
