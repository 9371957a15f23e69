//! Message direction and output format tags.

use std::fmt;
use std::str::FromStr;

/// Which side of an RPC is being decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Client to server; decoded against the method's input type.
    #[default]
    Request,
    /// Server to client; decoded against the method's output type.
    Response,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Request => "request",
            Direction::Response => "response",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "request" => Ok(Direction::Request),
            "response" => Ok(Direction::Response),
            other => Err(format!(
                "unknown direction '{other}', expected 'request' or 'response'"
            )),
        }
    }
}

/// Format tag published alongside the decoded text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageFormat {
    /// Canonical JSON produced from a known message schema.
    Json,
    /// Unknown-field text dump produced without a schema.
    Text,
}

impl MessageFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageFormat::Json => "json",
            MessageFormat::Text => "text",
        }
    }
}

impl fmt::Display for MessageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
