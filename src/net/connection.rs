//! TCP connection lifecycle: accept, connect, framed send, idempotent
//! shutdown.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};
use parking_lot::Mutex;

use super::error::NetError;
use super::protocol::{write_frame, WireMessage};

/// Deadline for an outbound connection attempt.
pub(crate) const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Deadline for the joiner to receive the host's handshake.
pub(crate) const HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Default deadline for a hosted game to be joined.
pub(crate) const DEFAULT_ACCEPT_TIMEOUT: Duration = Duration::from_secs(120);

/// Sleep between accept polls while waiting for a peer.
const ACCEPT_POLL_INTERVAL: Duration = Duration::from_millis(25);

/// Block until exactly one peer connects, polling a non-blocking listener
/// against the deadline so the wait can never hang forever.
pub(crate) fn accept_one(
    listener: &TcpListener,
    timeout: Duration,
) -> Result<TcpStream, NetError> {
    listener.set_nonblocking(true)?;
    let deadline = Instant::now() + timeout;
    loop {
        match listener.accept() {
            Ok((stream, peer)) => {
                info!("peer connected from {peer}");
                stream.set_nonblocking(false)?;
                return Ok(stream);
            }
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => {
                if Instant::now() >= deadline {
                    return Err(NetError::AcceptTimeout);
                }
                thread::sleep(ACCEPT_POLL_INTERVAL);
            }
            Err(err) => return Err(err.into()),
        }
    }
}

/// Resolve and connect to a host, failing rather than hanging on an
/// unreachable or non-listening address.
pub(crate) fn connect_to(addr: impl ToSocketAddrs) -> Result<TcpStream, NetError> {
    let resolved = addr
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| NetError::handshake("address resolved to nothing"))?;
    let stream = TcpStream::connect_timeout(&resolved, CONNECT_TIMEOUT)?;
    Ok(stream)
}

/// One established peer connection: the send half plus shutdown state.
///
/// The receive half is a separate cloned stream owned by the receive
/// thread; shutting this end down unblocks that thread's pending read.
pub(crate) struct Connection {
    stream: TcpStream,
    writer: Mutex<TcpStream>,
    closed: AtomicBool,
}

impl Connection {
    /// Wrap an established stream, returning the connection and the cloned
    /// read handle for the receive thread.
    pub(crate) fn establish(stream: TcpStream) -> Result<(Connection, TcpStream), NetError> {
        stream.set_nodelay(true)?;
        let reader = stream.try_clone()?;
        let writer = stream.try_clone()?;
        Ok((
            Connection {
                stream,
                writer: Mutex::new(writer),
                closed: AtomicBool::new(false),
            },
            reader,
        ))
    }

    /// Send one framed message; sends are serialized by the writer lock so
    /// frames never interleave.
    pub(crate) fn send(&self, msg: &WireMessage) -> Result<(), NetError> {
        if self.is_closed() {
            return Err(NetError::PeerDisconnected);
        }
        let mut writer = self.writer.lock();
        write_frame(&mut *writer, msg)
    }

    /// Shut the socket down, unblocking any pending read. Idempotent:
    /// every call after the first is a no-op, and shutdown-induced I/O
    /// errors on an already-dead socket are expected and ignored.
    pub(crate) fn shutdown(&self) {
        if self.closed.swap(true, Ordering::SeqCst) {
            return;
        }
        debug!("closing connection");
        let _ = self.stream.shutdown(Shutdown::Both);
    }

    #[inline]
    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub(crate) fn local_addr(&self) -> io::Result<SocketAddr> {
        self.stream.local_addr()
    }

    pub(crate) fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.stream.peer_addr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_times_out_without_peer() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let err = accept_one(&listener, Duration::from_millis(60)).unwrap_err();
        assert!(matches!(err, NetError::AcceptTimeout));
    }

    #[test]
    fn test_connect_to_closed_port_fails() {
        // Bind a port, learn it, then release it so nothing is listening
        let addr = {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap()
        };
        assert!(connect_to(addr).is_err());
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = std::thread::spawn(move || TcpStream::connect(addr).unwrap());
        let (stream, _) = listener.accept().unwrap();
        let _client = client.join().unwrap();

        let (conn, _reader) = Connection::establish(stream).unwrap();
        assert!(!conn.is_closed());
        conn.shutdown();
        assert!(conn.is_closed());
        conn.shutdown(); // second close must not error or panic
        assert!(conn.is_closed());
    }
}
