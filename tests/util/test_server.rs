use std::net::SocketAddr;
use std::thread::spawn;

use minhttp::server::{Config, Router, Server};

/// Config listening on an ephemeral local port.
pub fn test_config(router: Router) -> Config {
    Config::new("127.0.0.1:0", router)
}

/// Binds a server with the given config and runs it on a background thread.
/// The listener is bound before this returns, so clients can connect right away.
pub fn start_server(config: Config) -> SocketAddr {
    let server = Server::bind(config).unwrap();
    let addr = server.local_addr().unwrap();
    spawn(move || server.run().unwrap());
    addr
}
