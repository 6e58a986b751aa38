//! Error types for networked play.

use std::fmt;
use std::io;

/// Error type for connection and protocol failures.
///
/// Every variant is fatal to the connection it occurred on: the controller
/// closes the connection and surfaces the error once; it never reconnects.
#[derive(Debug)]
pub enum NetError {
    /// Underlying socket I/O failure
    Io(io::Error),
    /// No usable address, or the peer did not complete the handshake
    Handshake { reason: String },
    /// No peer connected before the accept deadline
    AcceptTimeout,
    /// Malformed or unexpected incoming frame
    Protocol { reason: String },
    /// The peer closed the connection
    PeerDisconnected,
}

impl NetError {
    pub(crate) fn protocol(reason: impl Into<String>) -> Self {
        NetError::Protocol {
            reason: reason.into(),
        }
    }

    pub(crate) fn handshake(reason: impl Into<String>) -> Self {
        NetError::Handshake {
            reason: reason.into(),
        }
    }
}

impl fmt::Display for NetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NetError::Io(err) => write!(f, "Connection I/O error: {err}"),
            NetError::Handshake { reason } => write!(f, "Handshake failed: {reason}"),
            NetError::AcceptTimeout => write!(f, "No peer connected before the deadline"),
            NetError::Protocol { reason } => write!(f, "Protocol error: {reason}"),
            NetError::PeerDisconnected => write!(f, "Peer closed the connection"),
        }
    }
}

impl std::error::Error for NetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            NetError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for NetError {
    fn from(err: io::Error) -> Self {
        NetError::Io(err)
    }
}
