//! Networked play: a controller that keeps two processes' game state
//! consistent over a TCP connection.
//!
//! One process hosts ([`GameHost`]) and plays White; the peer joins with
//! [`NetworkedChessController::connect`] and plays Black. Locally applied
//! moves are transmitted to the peer after they succeed; a dedicated
//! receive thread applies the peer's moves through the same
//! validate-apply-notify path, without retransmitting them, so the
//! consuming layer cannot distinguish a remote move from a local one.

mod connection;
mod error;
mod protocol;

pub use error::NetError;

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use parking_lot::Mutex;

use crate::board::{Color, GameState, Move, Piece, Square};
use crate::control::{
    ChessController, GameController, GameStateListener, IllegalMoveError, MoveListener,
    PromotionListener, SideListener,
};

use connection::{accept_one, connect_to, Connection, DEFAULT_ACCEPT_TIMEOUT, HANDSHAKE_TIMEOUT};
use protocol::{read_frame, WireMessage};

/// Callback invoked at most once when the connection dies: I/O failure,
/// malformed frame, or the peer disconnecting. Never invoked for a locally
/// requested `close()`.
pub type DisconnectListener = Box<dyn FnOnce(NetError) + Send>;

/// How long an arriving remote move may wait for this end's own turn
/// boundary. The peer transmits inside its `make_move`, so its reply can
/// reach us before our caller has run `end_turn` (or `start_game`); the
/// receive loop retries across that window instead of declaring a protocol
/// failure.
const REMOTE_APPLY_GRACE: Duration = Duration::from_secs(2);

/// Sleep between retries while waiting out the turn boundary.
const REMOTE_APPLY_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// A listening endpoint waiting for exactly one peer.
///
/// Binding and accepting are separate steps so the owner can display the
/// address to share before blocking on the peer's arrival.
pub struct GameHost {
    listener: TcpListener,
}

impl GameHost {
    /// Open a listening endpoint on `addr` (port 0 picks a free port).
    pub fn bind(addr: impl ToSocketAddrs) -> Result<Self, NetError> {
        let listener = TcpListener::bind(addr)?;
        info!("hosting game at {}", listener.local_addr()?);
        Ok(GameHost { listener })
    }

    /// The bound address, for display to the prospective peer.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Block until one peer connects, then complete the handshake. The
    /// host plays White; the peer is assigned Black.
    pub fn accept(self) -> Result<NetworkedChessController, NetError> {
        self.accept_with_timeout(DEFAULT_ACCEPT_TIMEOUT)
    }

    /// As [`GameHost::accept`], with an explicit deadline for the peer to
    /// arrive.
    pub fn accept_with_timeout(
        self,
        timeout: Duration,
    ) -> Result<NetworkedChessController, NetError> {
        let stream = accept_one(&self.listener, timeout)?;
        let (conn, reader) = Connection::establish(stream)?;
        conn.send(&WireMessage::Handshake { side: Color::Black })?;
        NetworkedChessController::from_connection(conn, reader, Color::White)
    }
}

/// Controller for one end of a networked game.
///
/// Wraps a [`ChessController`] and a connection to exactly one peer. The
/// wrapped controller enforces the usual turn machine; this type adds the
/// local-side gate, transmission of successful local moves, and the
/// receive thread applying the peer's moves.
pub struct NetworkedChessController {
    inner: ChessController,
    local_side: Color,
    conn: Arc<Connection>,
    disconnect: Arc<Mutex<Option<DisconnectListener>>>,
}

impl NetworkedChessController {
    /// Host a game: bind `addr`, wait for one peer, assign sides.
    /// Convenience for [`GameHost::bind`] followed by [`GameHost::accept`].
    pub fn host(addr: impl ToSocketAddrs) -> Result<Self, NetError> {
        GameHost::bind(addr)?.accept()
    }

    /// Join a hosted game at `addr`. Fails rather than hangs when the host
    /// is unreachable or never completes the handshake.
    pub fn connect(addr: impl ToSocketAddrs) -> Result<Self, NetError> {
        let stream = connect_to(addr)?;
        let (conn, mut reader) = Connection::establish(stream)?;

        reader.set_read_timeout(Some(HANDSHAKE_TIMEOUT))?;
        let local_side = match read_frame(&mut reader) {
            Ok(WireMessage::Handshake { side }) => side,
            Ok(other) => {
                conn.shutdown();
                return Err(NetError::handshake(format!(
                    "expected handshake, got {other:?}"
                )));
            }
            Err(err) => {
                conn.shutdown();
                return Err(NetError::handshake(format!("no handshake: {err}")));
            }
        };
        reader.set_read_timeout(None)?;

        Self::from_connection(conn, reader, local_side)
    }

    fn from_connection(
        conn: Connection,
        reader: TcpStream,
        local_side: Color,
    ) -> Result<Self, NetError> {
        info!("connected; playing {local_side}");
        let controller = NetworkedChessController {
            inner: ChessController::new(),
            local_side,
            conn: Arc::new(conn),
            disconnect: Arc::new(Mutex::new(None)),
        };
        controller.spawn_receive_loop(reader)?;
        Ok(controller)
    }

    /// The side assigned to this process; fixed for the connection's
    /// lifetime.
    #[must_use]
    pub fn local_side(&self) -> Color {
        self.local_side
    }

    /// Address of this end of the connection.
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.conn.local_addr()
    }

    /// Address of the remote peer.
    pub fn peer_addr(&self) -> io::Result<SocketAddr> {
        self.conn.peer_addr()
    }

    /// Register the callback that surfaces the single terminal connection
    /// error. A later registration replaces the prior one.
    pub fn set_disconnect_listener(&self, listener: DisconnectListener) {
        *self.disconnect.lock() = Some(listener);
    }

    /// Terminate the connection and unblock the pending receive.
    /// Idempotent: closing an already-closed or failed connection does
    /// nothing and never errors.
    pub fn close(&self) {
        self.conn.shutdown();
    }

    /// One receive thread per connection owns the blocking read loop; it
    /// exits when the frame stream ends, errors, or `close()` shuts the
    /// socket down under it.
    fn spawn_receive_loop(&self, mut reader: TcpStream) -> Result<(), NetError> {
        let inner = self.inner.clone();
        let conn = Arc::clone(&self.conn);
        let disconnect = Arc::clone(&self.disconnect);

        thread::Builder::new()
            .name("netchess-recv".to_string())
            .spawn(move || loop {
                match read_frame(&mut reader) {
                    Ok(WireMessage::Move {
                        from,
                        to,
                        promotion,
                    }) => {
                        let mv = Move { from, to, promotion };
                        debug!("received move {mv}");
                        // Applied through the same path as a local move, but
                        // never retransmitted
                        match apply_remote_move(&inner, &conn, mv) {
                            Ok(()) => {
                                inner.end_turn();
                                inner.begin_turn();
                            }
                            Err(err) => {
                                // The peer and we disagree on legality;
                                // terminating beats silently diverging
                                fail_connection(
                                    &conn,
                                    &disconnect,
                                    NetError::protocol(format!("illegal remote move {mv}: {err}")),
                                );
                                break;
                            }
                        }
                    }
                    Ok(WireMessage::Handshake { .. }) => {
                        fail_connection(
                            &conn,
                            &disconnect,
                            NetError::protocol("unexpected mid-game handshake"),
                        );
                        break;
                    }
                    Err(err) => {
                        if conn.is_closed() {
                            debug!("receive loop ending after local close");
                        } else {
                            let err = match err {
                                NetError::Io(io_err)
                                    if io_err.kind() == io::ErrorKind::UnexpectedEof =>
                                {
                                    NetError::PeerDisconnected
                                }
                                other => other,
                            };
                            fail_connection(&conn, &disconnect, err);
                        }
                        break;
                    }
                }
            })
            .map_err(NetError::Io)?;
        Ok(())
    }
}

/// Apply a peer's move, retrying through the grace window while this end's
/// caller finishes its own turn boundary.
fn apply_remote_move(
    inner: &ChessController,
    conn: &Connection,
    mv: Move,
) -> Result<(), IllegalMoveError> {
    let deadline = Instant::now() + REMOTE_APPLY_GRACE;
    loop {
        match inner.make_move(mv) {
            Ok(_) => return Ok(()),
            Err(err) => {
                if conn.is_closed() || Instant::now() >= deadline {
                    return Err(err);
                }
                thread::sleep(REMOTE_APPLY_POLL_INTERVAL);
            }
        }
    }
}

/// Close the connection and surface the terminal error to the owner, at
/// most once.
fn fail_connection(
    conn: &Connection,
    disconnect: &Mutex<Option<DisconnectListener>>,
    err: NetError,
) {
    warn!("connection failed: {err}");
    conn.shutdown();
    if let Some(listener) = disconnect.lock().take() {
        listener(err);
    }
}

impl GameController for NetworkedChessController {
    fn start_game(&self) {
        self.inner.start_game();
    }

    fn current_state(&self) -> GameState {
        self.inner.current_state()
    }

    fn current_side(&self) -> Color {
        self.inner.current_side()
    }

    fn moves_for_piece_at(&self, at: Square) -> Vec<Move> {
        self.inner.moves_for_piece_at(at)
    }

    fn move_results_in_capture(&self, mv: Move) -> bool {
        self.inner.move_results_in_capture(mv)
    }

    /// Apply a local move and, only if application succeeded, transmit it.
    /// Moves for the remote side are rejected before transmission, whatever
    /// the calling layer does.
    fn make_move(&self, mv: Move) -> Result<Move, IllegalMoveError> {
        if self.inner.current_side() != self.local_side {
            return Err(IllegalMoveError::NotYourTurn {
                local_side: self.local_side,
            });
        }
        let applied = self.inner.make_move(mv)?;
        if let Err(err) = self.conn.send(&WireMessage::from_move(&applied)) {
            if self.conn.is_closed() {
                debug!("move {applied} not transmitted, connection closed");
            } else {
                fail_connection(&self.conn, &self.disconnect, err);
            }
        }
        Ok(applied)
    }

    fn end_turn(&self) {
        self.inner.end_turn();
    }

    fn active_pieces(&self) -> Vec<((Color, Piece), Square)> {
        self.inner.active_pieces()
    }

    fn symbol_at(&self, at: Square) -> String {
        self.inner.symbol_at(at)
    }

    fn add_move_listener(&self, listener: MoveListener) {
        self.inner.add_move_listener(listener);
    }

    fn add_current_side_listener(&self, listener: SideListener) {
        self.inner.add_current_side_listener(listener);
    }

    fn add_game_state_listener(&self, listener: GameStateListener) {
        self.inner.add_game_state_listener(listener);
    }

    fn set_promotion_listener(&self, listener: PromotionListener) {
        self.inner.set_promotion_listener(listener);
    }
}

impl Drop for NetworkedChessController {
    fn drop(&mut self) {
        self.close();
    }
}
