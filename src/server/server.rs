use std::net::{SocketAddr, TcpListener, TcpStream};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use log::{debug, error, info, warn};

use crate::common::request::Request;
use crate::common::status;
use crate::parse::body::BodyParserRegistry;
use crate::server::config::Config;
use crate::server::connection::{Connection, ReadRequestError, State};
use crate::server::router::Router;
use crate::util::stream::Stream;
use crate::util::worker_pool::WorkerPool;

/// A connection with its parsed request, waiting for a worker.
type Job = (Connection<TcpStream>, Request);

/// An HTTP server with a bound listener.
///
/// Connections are accepted and read one at a time. Each parsed request is queued for the worker pool,
/// and a full queue blocks the accept loop until a worker frees a slot.
pub struct Server {
    listener: TcpListener,
    body_parsers: BodyParserRegistry,
    pool: WorkerPool<Job>,
}

impl Server {
    /// Binds the listener and starts the workers.
    pub fn bind(config: Config) -> std::io::Result<Server> {
        let listener = TcpListener::bind(&config.addr)?;
        let router = Arc::new(config.router);

        let pool = WorkerPool::new(config.worker_threads, config.queue_capacity, move |(connection, request): Job| {
            dispatch(&router, connection, request)
        })?;

        info!("Listening on {} with {} worker(s) and a queue of {}",
            listener.local_addr()?, config.worker_threads, config.queue_capacity);

        Ok(Server { listener, body_parsers: config.body_parsers, pool })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts connections until the listener fails. This function blocks.
    pub fn run(self) -> std::io::Result<()> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => self.accept(stream),
                Err(err) => error!("Failed to accept connection: {}", err)
            }
        }
        Ok(())
    }

    /// Reads the request from a new connection and queues it, or rejects it if it can't be parsed.
    fn accept(&self, stream: TcpStream) {
        let addr = match stream.peer_addr() {
            Ok(addr) => addr,
            Err(err) => {
                warn!("Dropping connection without a peer address: {}", err);
                return;
            }
        };

        let mut connection = Connection::new(addr, stream);

        let mut request = match connection.read_request() {
            Ok(request) => request,
            Err(ReadRequestError::Parse(err)) => {
                connection.reject(&err);
                return;
            }
            Err(ReadRequestError::Io(err)) => {
                warn!("Failed to read request from {}: {}", addr, err);
                connection.close();
                return;
            }
            Err(ReadRequestError::Closed) => {
                debug!("{} closed without sending a request", addr);
                return;
            }
        };

        if let Err(err) = self.body_parsers.apply(&mut request) {
            warn!("Leaving body of {} {} from {} unparsed: {}", request.method, request.path, addr, err);
        }

        connection.set_state(State::Enqueued);
        if let Err((mut connection, _)) = self.pool.execute((connection, request)) {
            error!("No workers left to handle request from {}", addr);
            connection.close();
        }
    }
}

/// Starts an HTTP server. This function blocks.
pub fn listen_http(config: Config) -> std::io::Result<()> {
    Server::bind(config)?.run()
}

/// Gets the response for the request from the router, writes it and closes the connection.
/// A panicking handler is answered with a 500 response.
fn dispatch<S: Stream>(router: &Router, mut connection: Connection<S>, request: Request) {
    connection.set_state(State::Dispatched);

    let response = catch_unwind(AssertUnwindSafe(|| router.respond(&request))).unwrap_or_else(|_| {
        error!("Handler for {} {} panicked", request.method, request.path);
        status::INTERNAL_SERVER_ERROR.into()
    });

    info!("{} \"{} {}\" {}", connection.addr, request.method, request.path, response.status.code);

    if let Err(err) = connection.respond(&response) {
        warn!("Failed to write response to {}: {}", connection.addr, err);
    }
    connection.close();
}
