//! Error types for descriptor resolution and payload decoding.

use thiserror::Error;

/// Errors that can occur while resolving a method schema or decoding a payload.
#[derive(Error, Debug)]
pub enum DecoderError {
    /// A required input (descriptor bundle, method path) was absent or empty.
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// The method path is not of the form `<package.Service>/<Method>`.
    #[error("Invalid method path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Malformed descriptor-set bytes or malformed message bytes.
    #[error("Protobuf decoding error: {0}")]
    Decode(String),

    /// A file names a dependency that is not part of the descriptor set.
    #[error("proto dependency {dependency} not found (required by {file})")]
    MissingDependency { file: String, dependency: String },

    /// A descriptor failed to link (dangling type reference, dependency cycle, ...).
    #[error("Invalid schema in {file}: {reason}")]
    InvalidSchema { file: String, reason: String },

    #[error("service {0} not found in proto")]
    ServiceNotFound(String),

    #[error("could not find method named {method} in service {service}")]
    MethodNotFound { service: String, method: String },

    /// A non-empty payload shorter than the frame header.
    #[error("Malformed frame: payload has {len} bytes, header needs {header_len}")]
    MalformedFrame { len: usize, header_len: usize },
}

impl From<protobuf::Error> for DecoderError {
    fn from(err: protobuf::Error) -> Self {
        DecoderError::Decode(err.to_string())
    }
}

/// Result type alias for decoder operations.
pub type Result<T> = std::result::Result<T, DecoderError>;
