//! Protobuf payload decoding.
//!
//! Turns a buffered, gRPC-framed payload into printable text:
//!
//! - [`frame`] - removal of the 5-byte length/flag prefix
//! - [`known`] - schema-aware decoding through protobuf reflection
//! - [`unknown`] - schema-less wire-level decoding
//! - [`json`] - canonical JSON rendering of schema-aware results
//! - [`text`] - text dump of schema-less results
//!
//! [`decode_payload`] ties these together and picks JSON or text depending on
//! whether a message descriptor is available.

pub mod frame;
pub mod json;
pub mod known;
pub mod text;
pub mod unknown;

pub use frame::{strip_frame, FrameHeader, FRAME_HEADER_LEN};
pub use json::{message_to_json, render_json, JsonOptions};
pub use known::decode_message;
pub use text::render_text;
pub use unknown::{parse_unknown, MAX_NESTING_DEPTH};

use pb_decoder_types::{MessageFormat, Result};
use protobuf::reflect::MessageDescriptor;
use tracing::debug;

/// Rendered result of decoding one payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    pub format: MessageFormat,
    pub text: String,
    /// Length of the message body after frame stripping. `None` when the
    /// payload was empty and nothing reached the decoder.
    pub message_length: Option<usize>,
}

/// Decode a framed payload.
///
/// With a descriptor the body is decoded against it and rendered as JSON,
/// otherwise it is parsed as unknown fields and rendered as a text dump. An
/// empty payload yields `{}` or an empty string respectively.
pub fn decode_payload(
    payload: &[u8],
    descriptor: Option<&MessageDescriptor>,
    options: &JsonOptions,
) -> Result<Decoded> {
    let format = if descriptor.is_some() {
        MessageFormat::Json
    } else {
        MessageFormat::Text
    };

    if payload.is_empty() {
        let text = match format {
            MessageFormat::Json => "{}".to_string(),
            MessageFormat::Text => String::new(),
        };
        return Ok(Decoded {
            format,
            text,
            message_length: None,
        });
    }

    let body = strip_frame(payload)?;
    debug!("Decoding {} byte message body as {}", body.len(), format);

    let text = match descriptor {
        Some(descriptor) => {
            let message = decode_message(body, descriptor)?;
            render_json(&message, options)?
        }
        None => render_text(&parse_unknown(body)?),
    };

    Ok(Decoded {
        format,
        text,
        message_length: Some(body.len()),
    })
}
