//! Gateway callout for decoding gRPC payloads.
//!
//! The callout is configured with [`CalloutConfig`] properties and runs
//! against a host [`FlowContext`]. It reads the descriptor bundle and method
//! path from flow variables, decodes the request or response body, and writes
//! the result back as flow variables:
//!
//! | Variable | Value |
//! |----------|-------|
//! | `pb-decoder.message-format` | `json` or `text` |
//! | `pb-decoder.message-data` | decoded text |
//! | `pb-decoder.info.stdout` | informational diagnostics |
//! | `pb-decoder.info.stderr` | error diagnostics |

pub mod config;
pub mod context;
pub mod decoder;
pub mod diagnostics;
pub mod error;

pub use config::CalloutConfig;
pub use context::{FlowContext, MemoryFlowContext};
pub use decoder::{
    ExecutionResult, ProtobufDecoder, VAR_INFO_STDERR, VAR_INFO_STDOUT, VAR_MESSAGE_DATA,
    VAR_MESSAGE_FORMAT, VAR_PREFIX,
};
pub use diagnostics::Diagnostics;
pub use error::ContextError;
