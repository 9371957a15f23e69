//! Host flow abstraction.
//!
//! The callout only needs three things from its host: read a flow variable,
//! write a flow variable, and read the buffered request or response body.

use crate::error::{ContextError, Result};
use pb_decoder_types::Direction;
use std::collections::{BTreeMap, HashMap};

/// The gateway flow a callout executes in.
pub trait FlowContext {
    /// Current value of a flow variable, if set.
    fn get_variable(&self, name: &str) -> Option<String>;

    /// Set a flow variable, replacing any previous value.
    fn set_variable(&mut self, name: &str, value: &str) -> Result<()>;

    /// Buffered body of the request or response message.
    fn message_content(&self, direction: Direction) -> Result<Vec<u8>>;
}

/// In-memory flow used by the CLI and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlowContext {
    variables: BTreeMap<String, String>,
    messages: HashMap<Direction, Vec<u8>>,
    read_only: bool,
}

impl MemoryFlowContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    pub fn with_message(mut self, direction: Direction, content: Vec<u8>) -> Self {
        self.messages.insert(direction, content);
        self
    }

    /// Reject every variable write, as a host in a failed state would.
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// All variables, sorted by name.
    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }
}

impl FlowContext for MemoryFlowContext {
    fn get_variable(&self, name: &str) -> Option<String> {
        self.variables.get(name).cloned()
    }

    fn set_variable(&mut self, name: &str, value: &str) -> Result<()> {
        if self.read_only {
            return Err(ContextError::VariableRejected {
                name: name.to_string(),
                reason: "flow is read-only".to_string(),
            });
        }
        self.variables.insert(name.to_string(), value.to_string());
        Ok(())
    }

    fn message_content(&self, direction: Direction) -> Result<Vec<u8>> {
        self.messages
            .get(&direction)
            .cloned()
            .ok_or_else(|| ContextError::MessageUnavailable(direction.to_string()))
    }
}
