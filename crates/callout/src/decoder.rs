//! The decoding callout.
//!
//! One execution:
//! 1. resolve the method schema from the descriptor and method-path variables
//!    (failure is logged and decoding continues without a schema)
//! 2. read the request or response body from the flow
//! 3. decode it as JSON (schema known) or as a text dump (schema unknown)
//! 4. publish the result and the captured diagnostics as flow variables
//!
//! Decode failures never fail the flow. Only a host that refuses to store the
//! outputs makes the execution abort.

use crate::config::CalloutConfig;
use crate::context::FlowContext;
use crate::diagnostics::Diagnostics;
use crate::error::ContextError;
use base64::Engine;
use pb_decoder_message::{decode_payload, strip_frame, Decoded, JsonOptions};
use pb_decoder_schema::{resolve_method, MethodPath, MethodSchema};
use pb_decoder_types::{DecoderError, Direction};
use protobuf::reflect::MessageDescriptor;
use tracing::{debug, warn};

/// Prefix shared by every output variable.
pub const VAR_PREFIX: &str = "pb-decoder";
pub const VAR_MESSAGE_FORMAT: &str = "pb-decoder.message-format";
pub const VAR_MESSAGE_DATA: &str = "pb-decoder.message-data";
pub const VAR_INFO_STDOUT: &str = "pb-decoder.info.stdout";
pub const VAR_INFO_STDERR: &str = "pb-decoder.info.stderr";

/// Outcome reported to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionResult {
    Success,
    Abort,
}

pub struct ProtobufDecoder {
    config: CalloutConfig,
    json_options: JsonOptions,
}

impl ProtobufDecoder {
    pub fn new(config: CalloutConfig) -> Self {
        Self {
            config,
            json_options: JsonOptions::default(),
        }
    }

    pub fn with_json_options(mut self, options: JsonOptions) -> Self {
        self.json_options = options;
        self
    }

    /// Run the callout against `ctx`.
    pub fn execute(&self, ctx: &mut dyn FlowContext) -> ExecutionResult {
        let mut diagnostics = Diagnostics::new();

        let result = match self.run(ctx, &mut diagnostics) {
            Ok(()) => ExecutionResult::Success,
            Err(e) => {
                diagnostics.error(format!("{e}"));
                ExecutionResult::Abort
            }
        };

        save_diagnostics(ctx, &diagnostics);
        result
    }

    fn run(
        &self,
        ctx: &mut dyn FlowContext,
        diagnostics: &mut Diagnostics,
    ) -> Result<(), ContextError> {
        let schema = match self.resolve(ctx) {
            Ok(schema) => Some(schema),
            Err(e) => {
                diagnostics.info(format!("could not find protobuf service/method. {e}"));
                None
            }
        };

        let direction = self.config.direction();
        let descriptor = schema.as_ref().map(|s| s.message_for(direction));

        let decoded = match self.decode(ctx, direction, descriptor, diagnostics) {
            Ok(decoded) => Some(decoded),
            Err(e) => {
                diagnostics.error(format!("could not decode protobuf. {e}"));
                None
            }
        };

        if let Some(decoded) = decoded {
            ctx.set_variable(VAR_MESSAGE_FORMAT, decoded.format.as_str())?;
            ctx.set_variable(VAR_MESSAGE_DATA, &decoded.text)?;
            if let Some(alias) = self.config.decoded_message_variable() {
                ctx.set_variable(alias, &decoded.text)?;
            }
        }

        Ok(())
    }

    /// Two-step lookup: property names the variable, the variable holds the value.
    fn input(&self, ctx: &dyn FlowContext, variable: &str) -> Option<String> {
        if variable.is_empty() {
            return None;
        }
        ctx.get_variable(variable).filter(|value| !value.is_empty())
    }

    fn resolve(&self, ctx: &dyn FlowContext) -> Result<MethodSchema, DecoderError> {
        let encoded = self.input(ctx, &self.config.descriptor_base64_ref);
        let path = self
            .input(ctx, &self.config.service_method_ref)
            .unwrap_or_default();

        let Some(encoded) = encoded else {
            return resolve_method(None, &path);
        };

        // Report a bad path before a bad descriptor.
        MethodPath::parse(&path)?;

        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| DecoderError::Decode(format!("invalid base64 descriptor: {e}")))?;
        resolve_method(Some(&bytes), &path)
    }

    fn decode(
        &self,
        ctx: &dyn FlowContext,
        direction: Direction,
        descriptor: Option<&MessageDescriptor>,
        diagnostics: &mut Diagnostics,
    ) -> Result<Decoded, DecodeFailure> {
        let payload = ctx.message_content(direction)?;
        debug!("Read {} byte {} payload", payload.len(), direction);

        if !payload.is_empty() {
            if let Ok(body) = strip_frame(&payload) {
                diagnostics.info(format!("message-length: {}", body.len()));
            }
        }

        Ok(decode_payload(&payload, descriptor, &self.json_options)?)
    }
}

/// Why a payload could not be decoded.
#[derive(Debug, thiserror::Error)]
enum DecodeFailure {
    #[error(transparent)]
    Context(#[from] ContextError),
    #[error(transparent)]
    Decoder(#[from] DecoderError),
}

fn save_diagnostics(ctx: &mut dyn FlowContext, diagnostics: &Diagnostics) {
    for (name, value) in [
        (VAR_INFO_STDOUT, diagnostics.stdout()),
        (VAR_INFO_STDERR, diagnostics.stderr()),
    ] {
        if let Err(e) = ctx.set_variable(name, value) {
            warn!("Failed to publish {name}: {e}");
        }
    }
}
