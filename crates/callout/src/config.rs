//! Callout properties.
//!
//! Properties are the static configuration a host attaches to a callout. Most
//! of them do not carry values directly; they name the flow variable that holds
//! the value at execution time.

use crate::error::{ContextError, Result};
use pb_decoder_types::Direction;
use serde::de::value::MapDeserializer;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::warn;

pub const PROP_MESSAGE_REF: &str = "pb-message-ref";
pub const PROP_SERVICE_METHOD_REF: &str = "pb-service-method-ref";
pub const PROP_DESCRIPTOR_BASE64_REF: &str = "pb-descriptor-base64-ref";
pub const PROP_DECODED_MESSAGE_REF: &str = "pb-decoded-message-ref";

/// Typed view of the callout properties.
///
/// Unrecognised properties are ignored so hosts can pass their own settings
/// alongside these. A missing property reads as an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CalloutConfig {
    /// `request` or `response`.
    #[serde(rename = "pb-message-ref", default)]
    pub message_ref: String,

    /// Variable holding the `<package.Service>/<Method>` path.
    #[serde(rename = "pb-service-method-ref", default)]
    pub service_method_ref: String,

    /// Variable holding the base64 `FileDescriptorSet`.
    #[serde(rename = "pb-descriptor-base64-ref", default)]
    pub descriptor_base64_ref: String,

    /// Extra variable that also receives the decoded text.
    #[serde(rename = "pb-decoded-message-ref", default)]
    pub decoded_message_ref: String,
}

impl CalloutConfig {
    /// Build the configuration from the host's property map.
    pub fn from_properties(properties: &HashMap<String, String>) -> Result<Self> {
        let deserializer = MapDeserializer::<_, serde::de::value::Error>::new(
            properties.iter().map(|(k, v)| (k.as_str(), v.as_str())),
        );
        Self::deserialize(deserializer).map_err(|e| ContextError::Config(e.to_string()))
    }

    /// Direction to decode. Anything other than `response` selects the request.
    pub fn direction(&self) -> Direction {
        match self.message_ref.as_str() {
            "response" => Direction::Response,
            "request" | "" => Direction::Request,
            other => {
                warn!("Unrecognised {PROP_MESSAGE_REF} value '{other}', decoding the request");
                Direction::Request
            }
        }
    }

    /// Alias variable for the decoded text, if configured.
    pub fn decoded_message_variable(&self) -> Option<&str> {
        Some(self.decoded_message_ref.as_str()).filter(|name| !name.is_empty())
    }
}
