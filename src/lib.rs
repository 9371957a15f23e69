//! pb-decoder library
//!
//! Support code for the `pb-decoder` command line tool: option groups shared
//! by its subcommands, descriptor bundle loading, payload loading, and the
//! TOML flow files consumed by `pb-decoder callout`.
//!
//! The decoding itself lives in the workspace crates:
//!
//! - `pb_decoder_schema` - descriptor linking and method resolution
//! - `pb_decoder_message` - frame stripping, decoding, JSON/text rendering
//! - `pb_decoder_callout` - the gateway callout and its flow abstraction
//!
//! # CLI Usage
//!
//! ```bash
//! # Decode a captured request body against a compiled descriptor set
//! pb-decoder decode --descriptor-set api.pb \
//!   --method example.v1.Orders/Place --payload request.bin
//!
//! # Compile .proto sources on the fly
//! pb-decoder decode --proto protos/orders.proto --include protos \
//!   --method example.v1.Orders/Place --direction response --payload response.bin
//!
//! # List services and methods
//! pb-decoder describe --descriptor-set api.pb
//!
//! # Run the callout against a flow file
//! pb-decoder callout --flow flow.toml
//! ```

use clap::Parser;
use pb_decoder_message::JsonOptions;
use std::path::PathBuf;

pub mod descriptor;
pub mod flow;
pub mod payload;

pub use descriptor::{compile_protos, load_descriptor_set};
pub use flow::FlowFile;
pub use payload::read_payload;

/// Where the `FileDescriptorSet` comes from. At most one source is used; the
/// first given of `--descriptor-set`, `--descriptor-base64`, `--proto` wins.
#[derive(Parser, Clone, Debug, Default)]
pub struct DescriptorOpts {
    /// Binary FileDescriptorSet (protoc --descriptor_set_out --include_imports)
    #[arg(long, value_name = "PATH")]
    pub descriptor_set: Option<PathBuf>,

    /// Base64-encoded FileDescriptorSet
    #[arg(long, env = "PB_DESCRIPTOR_BASE64", hide_env_values = true)]
    pub descriptor_base64: Option<String>,

    /// .proto source files to compile (pure Rust parser, no protoc needed)
    #[arg(long = "proto", value_name = "PATH")]
    pub protos: Vec<PathBuf>,

    /// Include directories for --proto imports (defaults to each file's directory)
    #[arg(long = "include", short = 'I', value_name = "DIR")]
    pub includes: Vec<PathBuf>,
}

impl DescriptorOpts {
    pub fn is_empty(&self) -> bool {
        self.descriptor_set.is_none()
            && self.descriptor_base64.as_deref().unwrap_or_default().is_empty()
            && self.protos.is_empty()
    }
}

/// Where the framed message payload comes from.
#[derive(Parser, Clone, Debug, Default)]
pub struct PayloadOpts {
    /// File holding the payload; `-` reads stdin
    #[arg(long, value_name = "PATH", default_value = "-")]
    pub payload: PathBuf,

    /// Treat the payload contents as base64 text
    #[arg(long)]
    pub base64: bool,

    /// Payload is a bare protobuf message without the 5-byte gRPC prefix
    #[arg(long)]
    pub unframed: bool,
}

/// JSON rendering options.
#[derive(Parser, Clone, Debug, Default)]
pub struct JsonOpts {
    /// Single-line JSON output
    #[arg(long)]
    pub compact: bool,

    /// Use field names from the .proto file instead of lowerCamelCase
    #[arg(long)]
    pub preserve_proto_field_names: bool,
}

impl From<&JsonOpts> for JsonOptions {
    fn from(opts: &JsonOpts) -> Self {
        Self {
            pretty: !opts.compact,
            preserve_proto_field_names: opts.preserve_proto_field_names,
        }
    }
}
