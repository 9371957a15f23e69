//! Frame stripping.
//!
//! Implements removal of the 5-byte gRPC message prefix:
//! ```text
//! ┌────────────┬──────────────┬─────────────────┐
//! │ Compressed │ Length       │ Message         │
//! │ 1 byte     │ 4 bytes      │ Length bytes    │
//! │ 0 or 1     │ uint32 BE    │ protobuf        │
//! └────────────┴──────────────┴─────────────────┘
//! ```
//!
//! The header is removed unconditionally. Neither the compressed flag nor the
//! declared length is enforced; mismatches are only logged.

use pb_decoder_types::{DecoderError, Result};
use tracing::debug;

/// Header size in bytes (fixed, exactly 5).
pub const FRAME_HEADER_LEN: usize = 5;

/// Decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Compression flag byte was non-zero.
    pub compressed: bool,
    /// Message length announced by the header.
    pub declared_length: u32,
}

impl FrameHeader {
    /// Read the header from the start of `payload`, if it is long enough.
    pub fn parse(payload: &[u8]) -> Option<Self> {
        let header = payload.get(..FRAME_HEADER_LEN)?;
        Some(Self {
            compressed: header[0] != 0,
            declared_length: u32::from_be_bytes([header[1], header[2], header[3], header[4]]),
        })
    }
}

/// Remove the frame header from a buffered payload.
///
/// An empty payload yields an empty slice. A non-empty payload shorter than
/// the header fails with `MalformedFrame`.
pub fn strip_frame(payload: &[u8]) -> Result<&[u8]> {
    if payload.is_empty() {
        return Ok(payload);
    }

    let header = FrameHeader::parse(payload).ok_or(DecoderError::MalformedFrame {
        len: payload.len(),
        header_len: FRAME_HEADER_LEN,
    })?;
    let body = &payload[FRAME_HEADER_LEN..];

    if header.compressed {
        debug!("Frame header has the compressed flag set; decoding body as-is");
    }
    if header.declared_length as usize != body.len() {
        debug!(
            "Frame header declares {} bytes but {} follow",
            header.declared_length,
            body.len()
        );
    }

    Ok(body)
}
