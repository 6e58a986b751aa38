//! Wire protocol: message types and framing.
//!
//! Each message is a bincode-encoded [`WireMessage`] preceded by a 4-byte
//! big-endian payload length. The transport is ordered and reliable, so the
//! length prefix is the only framing needed.

use std::io::{Read, Write};

use serde::{Deserialize, Serialize};

use crate::board::{Color, Move, Piece, Square};

use super::error::NetError;

/// Upper bound on a frame payload. Both message kinds encode to a handful
/// of bytes; anything larger is a corrupt or hostile stream.
const MAX_FRAME_LEN: u32 = 256;

/// Messages exchanged between peers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) enum WireMessage {
    /// Sent once by the host on connection establishment; `side` is the
    /// side assigned to the receiving peer.
    Handshake { side: Color },
    /// One applied move. Promotion moves always carry the resolved choice,
    /// so the receiving end never has to prompt.
    Move {
        from: Square,
        to: Square,
        promotion: Option<Piece>,
    },
}

impl WireMessage {
    pub(crate) fn from_move(mv: &Move) -> Self {
        WireMessage::Move {
            from: mv.from,
            to: mv.to,
            promotion: mv.promotion,
        }
    }
}

/// Serialize and frame one message onto the stream.
pub(crate) fn write_frame<W: Write>(writer: &mut W, msg: &WireMessage) -> Result<(), NetError> {
    let payload =
        bincode::serialize(msg).map_err(|err| NetError::protocol(format!("encode: {err}")))?;
    let len = u32::try_from(payload.len())
        .map_err(|_| NetError::protocol("payload exceeds frame size"))?;
    writer.write_all(&len.to_be_bytes())?;
    writer.write_all(&payload)?;
    writer.flush()?;
    Ok(())
}

/// Read and decode one framed message, blocking until a full frame arrives.
pub(crate) fn read_frame<R: Read>(reader: &mut R) -> Result<WireMessage, NetError> {
    let mut header = [0u8; 4];
    reader.read_exact(&mut header)?;
    let len = u32::from_be_bytes(header);
    if len == 0 || len > MAX_FRAME_LEN {
        return Err(NetError::protocol(format!("invalid frame length {len}")));
    }
    let mut payload = vec![0u8; len as usize];
    reader.read_exact(&mut payload)?;
    bincode::deserialize(&payload).map_err(|err| NetError::protocol(format!("decode: {err}")))
}
