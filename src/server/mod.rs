pub use config::*;
pub use router::*;
pub use server::*;
pub use write::*;

/// Entry point for starting a server.
mod server;
/// Config for a server.
mod config;
/// Router for routing requests.
mod router;
/// Response serialization.
mod write;
/// Connection for storing state about a connection to a client.
pub mod connection;
