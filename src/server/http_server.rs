use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::Duration;
use tracing::{info, warn};

/// Maximum request headers accepted per request.
pub const MAX_HEADERS: usize = 32;

const READY_ATTEMPTS: u32 = 100;
const READY_INTERVAL: Duration = Duration::from_millis(5);

/// Wrapper around may_minihttp's HTTP server
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server
///
/// Dropping the handle leaves the server running; call [`ServerHandle::stop`]
/// to shut it down.
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl ServerHandle {
    /// Address the server was bound to.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Wait for the server to be ready to accept connections
    ///
    /// Polls the bound address with TCP connects.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` if no connection succeeds within about half a second.
    pub fn wait_ready(&self) -> io::Result<()> {
        for _ in 0..READY_ATTEMPTS {
            if TcpStream::connect(self.addr).is_ok() {
                return Ok(());
            }
            thread::sleep(READY_INTERVAL);
        }
        Err(io::Error::new(io::ErrorKind::TimedOut, "server not ready"))
    }

    /// Stop the server
    ///
    /// Cancels the accept coroutine and waits for it to finish.
    pub fn stop(self) {
        // SAFETY: cancel() is unsafe in the may runtime. The handle is owned and
        // valid, and cancellation is the intended shutdown path.
        unsafe {
            self.handle.coroutine().cancel();
        }
        if self.handle.join().is_err() {
            warn!(addr = %self.addr, "Server coroutine ended with a panic during shutdown");
        }
        info!(addr = %self.addr, "Server stopped");
    }

    /// Block until the server coroutine completes
    ///
    /// # Errors
    ///
    /// Returns an error if the server coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Start the HTTP server on the given address
    ///
    /// # Errors
    ///
    /// Returns an error if the address does not resolve or cannot be bound.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> io::Result<ServerHandle> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "invalid address"))?;
        let handle = HttpServerWithHeaders::<_, MAX_HEADERS>(self.0).start(addr)?;
        info!(addr = %addr, "Server listening");
        Ok(ServerHandle { addr, handle })
    }
}
