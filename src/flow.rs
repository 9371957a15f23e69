//! TOML flow files for `pb-decoder callout`.
//!
//! A flow file describes what a gateway would hand the callout: its
//! properties, the flow variables visible to it, and the buffered messages.
//!
//! ```toml
//! [properties]
//! pb-message-ref = "request"
//! pb-service-method-ref = "grpc.path"
//! pb-descriptor-base64-ref = "grpc.descriptor"
//! pb-decoded-message-ref = "grpc.decoded"
//!
//! [variables]
//! "grpc.path" = "shop.OrderService/Place"
//! "grpc.descriptor" = "CqIBChBzaG9wL29yZGVyLnByb3Rv..."
//!
//! [messages]
//! request = "AAAAABAKBWhlbGxvEgcINRIDcmVk"   # base64, framed
//! ```

use anyhow::Context;
use base64::Engine;
use pb_decoder_callout::{CalloutConfig, MemoryFlowContext};
use pb_decoder_types::Direction;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowFile {
    /// Callout properties.
    #[serde(default)]
    pub properties: HashMap<String, String>,

    /// Flow variables present before the callout runs.
    #[serde(default)]
    pub variables: BTreeMap<String, String>,

    #[serde(default)]
    pub messages: FlowMessages,
}

/// Base64-encoded message bodies, as the transport delivered them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FlowMessages {
    pub request: Option<String>,
    pub response: Option<String>,
}

impl FlowFile {
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read flow file {path:?}"))?;
        Self::from_toml(&text).with_context(|| format!("Invalid flow file {path:?}"))
    }

    pub fn from_toml(text: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn config(&self) -> anyhow::Result<CalloutConfig> {
        Ok(CalloutConfig::from_properties(&self.properties)?)
    }

    /// Build the in-memory flow the callout runs against.
    pub fn to_context(&self) -> anyhow::Result<MemoryFlowContext> {
        let mut ctx = MemoryFlowContext::new();
        for (name, value) in &self.variables {
            ctx = ctx.with_variable(name.clone(), value.clone());
        }

        for (direction, encoded) in [
            (Direction::Request, &self.messages.request),
            (Direction::Response, &self.messages.response),
        ] {
            if let Some(encoded) = encoded {
                let content = base64::engine::general_purpose::STANDARD
                    .decode(encoded.trim())
                    .with_context(|| format!("The {direction} message is not valid base64"))?;
                ctx = ctx.with_message(direction, content);
            }
        }

        Ok(ctx)
    }
}
