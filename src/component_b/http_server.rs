//! http_server.rs
//! Single-client HTTP server over the shared snapshot.
//!
//! - Listener built with socket2 so the backlog is explicit (5 on the device).
//! - One connection at a time: one read of up to 1024 bytes, classify, respond, close.
//! - No keep-alive and no read/write timeouts; a stalled client stalls the loop.
//! - Per-connection failures are logged and the loop keeps accepting.
//! - `ServerHandle::stop` shuts down the client being served (if any) and wakes the
//!   blocking accept with a loopback connection so `run` can return and drop the listener.

use log::{debug, error, info, warn};
use parking_lot::Mutex;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::{
    io::{Read, Write},
    net::{IpAddr, Ipv4Addr, Ipv6Addr, Shutdown, SocketAddr, TcpListener, TcpStream},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::Duration,
};

use crate::component_b::{
    dispatcher::{classify, Route},
    response::render,
};
use crate::config::RECV_BUFFER_SIZE;
use crate::error::{ConnectionError, StartupError};
use crate::utils::shared_state::{SharedState, SharedStateHandle};

const WAKE_CONNECT_TIMEOUT: Duration = Duration::from_secs(1);

/// Clone of the connection currently being served, so `stop` can interrupt a
/// blocked read or write.
type ActiveClient = Arc<Mutex<Option<TcpStream>>>;

pub struct HttpServer {
    listener: TcpListener,
    local_addr: SocketAddr,
    state: SharedStateHandle,
    stop: Arc<AtomicBool>,
    active: ActiveClient,
}

/// Cancellation hook for a running server. Cloneable across threads.
#[derive(Clone)]
pub struct ServerHandle {
    stop: Arc<AtomicBool>,
    active: ActiveClient,
    wake_addr: SocketAddr,
}

impl HttpServer {
    pub fn bind(addr: SocketAddr, backlog: i32, state: SharedStateHandle) -> Result<Self, StartupError> {
        let bind_err = |source| StartupError::Bind { addr, source };

        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
            .map_err(bind_err)?;
        socket.set_reuse_address(true).ok();
        socket.bind(&SockAddr::from(addr)).map_err(bind_err)?;
        socket.listen(backlog).map_err(bind_err)?;

        let listener: TcpListener = socket.into();
        let local_addr = listener.local_addr().map_err(bind_err)?;
        info!("[Server] Listening on {} (backlog {})", local_addr, backlog);

        Ok(Self {
            listener,
            local_addr,
            state,
            stop: Arc::new(AtomicBool::new(false)),
            active: Arc::new(Mutex::new(None)),
        })
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn handle(&self) -> ServerHandle {
        ServerHandle {
            stop: self.stop.clone(),
            active: self.active.clone(),
            wake_addr: wake_addr(self.local_addr),
        }
    }

    /// Accept loop. Returns only after `ServerHandle::stop`; the listener is
    /// closed when `self` is dropped on return.
    pub fn run(self) {
        let mut served: u64 = 0;

        for conn in self.listener.incoming() {
            if self.stop.load(Ordering::Acquire) {
                break;
            }

            match conn {
                Ok(stream) => {
                    let peer = stream.peer_addr().ok();
                    debug!("[Server] Client connected from {:?}", peer);
                    if !self.track(&stream) {
                        break;
                    }
                    let result = serve_connection(stream, &self.state);
                    self.active.lock().take();
                    match result {
                        Ok(route) => {
                            served += 1;
                            debug!("[Server] {:?} response sent to {:?}", route, peer);
                        }
                        Err(e) if self.stop.load(Ordering::Acquire) => {
                            debug!("[Server] client {:?} cut off by stop: {}", peer, e)
                        }
                        Err(e) => warn!("[Server] client {:?}: {}", peer, e),
                    }
                }
                Err(e) => error!("[Server] accept error: {}", e),
            }
        }

        info!("[Server] stopped after {} responses, closing {}", served, self.local_addr);
    }

    /// Publishes a clone of `stream` in the active slot. Returns false if a stop
    /// raced in; the flag is re-read under the lock `stop` also takes, so either
    /// `stop` sees the clone or this sees the flag.
    fn track(&self, stream: &TcpStream) -> bool {
        let mut active = self.active.lock();
        match stream.try_clone() {
            Ok(clone) => *active = Some(clone),
            Err(e) => warn!("[Server] cannot track client for stop: {}", e),
        }
        if self.stop.load(Ordering::Acquire) {
            active.take();
            return false;
        }
        true
    }
}

impl ServerHandle {
    pub fn stop(&self) {
        let already_stopped = self.stop.swap(true, Ordering::AcqRel);

        // unblock a read/write on a client that never finishes its request
        if let Some(client) = self.active.lock().as_ref() {
            if let Err(e) = client.shutdown(Shutdown::Both) {
                debug!("[Server] shutting down active client: {}", e);
            }
        }
        if already_stopped {
            return;
        }

        // unblock accept(); the loop sees the flag before serving this connection
        if let Err(e) = TcpStream::connect_timeout(&self.wake_addr, WAKE_CONNECT_TIMEOUT) {
            warn!("[Server] wake-up connection to {} failed: {}", self.wake_addr, e);
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Serves exactly one request on `stream` and closes it.
///
/// The stream is owned, so it is dropped (closed) on every return path.
pub fn serve_connection<S: Read + Write>(mut stream: S, state: &SharedState) -> Result<Route, ConnectionError> {
    let mut buf = [0u8; RECV_BUFFER_SIZE];
    let n = stream.read(&mut buf).map_err(ConnectionError::Read)?;
    let request = &buf[..n];
    debug!("[Server] Request: {}", String::from_utf8_lossy(request));

    let route = classify(request);
    let response = render(route, || state.snapshot().reading);

    stream
        .write_all(&response.to_bytes())
        .and_then(|_| stream.flush())
        .map_err(ConnectionError::Write)?;

    Ok(route)
}

fn wake_addr(local: SocketAddr) -> SocketAddr {
    let ip = match local.ip() {
        IpAddr::V4(v4) if v4.is_unspecified() => IpAddr::V4(Ipv4Addr::LOCALHOST),
        IpAddr::V6(v6) if v6.is_unspecified() => IpAddr::V6(Ipv6Addr::LOCALHOST),
        ip => ip,
    };
    SocketAddr::new(ip, local.port())
}
