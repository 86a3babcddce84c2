use may::coroutine::{self, JoinHandle};
use may::net::TcpListener;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use super::connection::ConnectionHandler;
use super::framing::MessageReader;
use crate::dispatcher::Dispatcher;
use crate::logger::{Logger, PerfStatus};
use crate::module::RouteTable;
use crate::router::RouteTrie;
use crate::runtime_config::RuntimeConfig;

/// Connection acceptor on `may` coroutines
///
/// One coroutine runs the accept loop; every accepted connection gets its
/// own coroutine with `stack_size` bytes of stack and is served
/// independently of the others.
pub struct HttpServer {
    handler: Arc<ConnectionHandler>,
    stack_size: usize,
    read_timeout: Option<Duration>,
}

/// Handle to a running HTTP server
///
/// Provides methods for waiting until the server is ready, stopping it,
/// or joining the accept coroutine.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// The bound address (resolves port 0 to the actual port)
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// Polls the server address by attempting TCP connections until successful.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if the server doesn't become ready within ~250ms (50 attempts × 5ms).
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..50 {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(5));
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop accepting connections
    ///
    /// Cancels the accept coroutine and waits for it to finish. Connections
    /// already being served run to completion on their own coroutines.
    pub fn stop(self) {
        // SAFETY: cancel() is unsafe in may because the coroutine unwinds at
        // its next yield point. The accept loop holds nothing but the listener
        // and a shared handler, both of which are fine to drop mid-loop.
        unsafe {
            self.handle.coroutine().cancel();
        }
        // A cancelled coroutine reports a panic; that is the expected outcome here
        let _ = self.handle.join();
    }

    /// Block until the accept coroutine finishes (normally never)
    ///
    /// # Errors
    ///
    /// Returns an error if the accept coroutine panicked or was cancelled.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl HttpServer {
    #[must_use]
    pub fn new(dispatcher: Dispatcher, config: &RuntimeConfig, logger: Arc<dyn Logger>) -> Self {
        let handler = ConnectionHandler::new(dispatcher, MessageReader::from_config(config), logger);
        Self {
            handler: Arc::new(handler),
            stack_size: config.stack_size,
            read_timeout: config.read_timeout(),
        }
    }

    /// Bind `addr` and start the accept loop
    ///
    /// # Errors
    ///
    /// Returns an error if the address is invalid or the port cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let listener = TcpListener::bind(addr)?;
        let addr = listener.local_addr()?;

        // SAFETY: may marks spawn unsafe because a coroutine must not block the
        // worker thread with thread-local or blocking std primitives. The accept
        // loop only uses may's own non-blocking listener.
        let handle = unsafe {
            coroutine::Builder::new()
                .name("sprint-acceptor".to_string())
                .spawn(move || self.accept_loop(listener))?
        };
        Ok(ServerHandle { addr, handle })
    }

    fn accept_loop(self, listener: TcpListener) {
        let logger = Arc::clone(self.handler.logger());
        loop {
            let (mut stream, peer) = match listener.accept() {
                Ok(accepted) => accepted,
                Err(e) => {
                    logger.error(
                        "ServerCore",
                        &format!("Error during connection acceptance: {e}"),
                    );
                    continue;
                }
            };

            if let Some(timeout) = self.read_timeout {
                if let Err(e) = stream.set_read_timeout(Some(timeout)) {
                    logger.warn(
                        "ServerCore",
                        &format!("Could not set read timeout for {peer}: {e}"),
                    );
                }
            }

            let handler = Arc::clone(&self.handler);
            // SAFETY: connection coroutines only touch may's TcpStream and the
            // shared, read-only dispatcher.
            let spawned = unsafe {
                coroutine::Builder::new()
                    .stack_size(self.stack_size)
                    .spawn(move || handler.serve(&mut stream, &peer.to_string()))
            };
            if let Err(e) = spawned {
                logger.error(
                    "ServerCore",
                    &format!("Failed to spawn connection coroutine for {peer}: {e}"),
                );
            }
        }
    }
}

/// One-call embedding entry point: route table in, running server out
pub struct Server {
    config: RuntimeConfig,
    logger: Arc<dyn Logger>,
}

impl Server {
    #[must_use]
    pub fn new(config: RuntimeConfig, logger: Arc<dyn Logger>) -> Self {
        Self { config, logger }
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Build the trie from `routes` and start listening on the configured address
    pub fn start(&self, routes: &RouteTable) -> io::Result<ServerHandle> {
        let started = Instant::now();
        self.logger
            .log("ServerCore", "Starting Sprint Application ...");

        let trie = RouteTrie::build(routes.routes(), self.logger.as_ref());
        let dispatcher = Dispatcher::new(trie, Arc::clone(&self.logger));
        let handle = HttpServer::new(dispatcher, &self.config, Arc::clone(&self.logger))
            .start(self.config.address())?;

        self.logger.perf_log(
            "ServerCore",
            "Sprint application successfully started",
            started.elapsed(),
            PerfStatus::Ok,
        );
        self.logger.log(
            "ServerCore",
            &format!("Listening on http://{}", handle.local_addr()),
        );
        Ok(handle)
    }

    /// Start and block on the accept loop
    pub fn run(&self, routes: &RouteTable) -> io::Result<()> {
        let handle = self.start(routes)?;
        handle
            .join()
            .map_err(|_| io::Error::other("accept loop terminated"))
    }
}
