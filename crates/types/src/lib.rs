//! Shared types for runtime protobuf payload decoding.
//!
//! This crate holds the data model that the schema, message, and callout
//! crates exchange:
//!
//! - [`direction`] - request/response selection and the `json`/`text` format tag
//! - [`proto`] - decoded message tree for payloads with a known schema
//! - [`unknown`] - wire-level field model for payloads without a schema
//! - [`error`] - the error taxonomy shared by every stage
//!
//! # Dependency Flow
//!
//! ```text
//! pb-decoder-types (this crate)
//!   ├── pb-decoder-schema   (descriptor graph + method resolution)
//!   ├── pb-decoder-message  (frame stripping, decoding, rendering)
//!   └── pb-decoder-callout  (orchestration against a host flow)
//! ```

pub mod direction;
pub mod error;
pub mod proto;
pub mod unknown;

pub use direction::{Direction, MessageFormat};
pub use error::{DecoderError, Result};
pub use proto::{DecodedField, DecodedMessage, FieldValue};
pub use unknown::{UnknownField, UnknownFieldSet, UnknownValue, WireType};
