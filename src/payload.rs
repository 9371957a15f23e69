//! Payload loading for `pb-decoder decode`.

use crate::PayloadOpts;
use anyhow::Context;
use base64::Engine;
use pb_decoder_message::FRAME_HEADER_LEN;
use std::io::Read;

/// Read the payload named by `opts` and return it in framed form.
///
/// An empty input stays empty so it decodes to the empty sentinel.
pub fn read_payload(opts: &PayloadOpts) -> anyhow::Result<Vec<u8>> {
    let raw = if opts.payload.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .context("Failed to read payload from stdin")?;
        buf
    } else {
        std::fs::read(&opts.payload)
            .with_context(|| format!("Failed to read payload from {:?}", opts.payload))?
    };

    let bytes = if opts.base64 {
        let text = String::from_utf8(raw).context("Base64 payload is not UTF-8 text")?;
        base64::engine::general_purpose::STANDARD
            .decode(text.trim())
            .context("Payload is not valid base64")?
    } else {
        raw
    };

    Ok(if opts.unframed { frame(&bytes) } else { bytes })
}

/// Prefix `message` with an uncompressed gRPC frame header.
pub fn frame(message: &[u8]) -> Vec<u8> {
    if message.is_empty() {
        return Vec::new();
    }
    let mut framed = Vec::with_capacity(FRAME_HEADER_LEN + message.len());
    framed.push(0);
    framed.extend_from_slice(&(message.len() as u32).to_be_bytes());
    framed.extend_from_slice(message);
    framed
}
