//! Command-line interface for pb-decoder
//!
//! # Usage Examples
//!
//! ## Decode
//! ```bash
//! # Request body captured from a gRPC call, schema from protoc output
//! pb-decoder decode --descriptor-set api.pb \
//!   --method example.v1.Orders/Place --payload request.bin
//!
//! # Response body as base64, schema compiled from sources
//! pb-decoder decode --proto protos/orders.proto -I protos \
//!   --method example.v1.Orders/Place --direction response \
//!   --payload response.b64 --base64
//!
//! # No schema: wire-level text dump
//! pb-decoder decode --payload request.bin
//! ```
//!
//! ## Describe
//! ```bash
//! pb-decoder describe --descriptor-set api.pb
//! pb-decoder describe --descriptor-set api.pb --method example.v1.Orders/Place --json
//! ```
//!
//! ## Callout
//! ```bash
//! # Prints the flow variables after execution as TOML
//! pb-decoder callout --flow flow.toml
//! ```
//!
//! Logs go to stderr and are controlled with `RUST_LOG`.

use anyhow::Context;
use clap::{Parser, Subcommand};
use pb_decoder::{
    load_descriptor_set, read_payload, DescriptorOpts, FlowFile, JsonOpts, PayloadOpts,
};
use pb_decoder_callout::{ExecutionResult, ProtobufDecoder};
use pb_decoder_message::{decode_payload, JsonOptions};
use pb_decoder_schema::{resolve_method, DescriptorIndex, MethodPath, MethodSchema};
use pb_decoder_types::Direction;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pb-decoder")]
#[command(about = "Decode gRPC protobuf payloads using runtime-loaded descriptor sets")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one framed payload to JSON (schema known) or a text dump
    Decode {
        /// Method path, `<package.Service>/<Method>`
        #[arg(long, env = "PB_METHOD_PATH")]
        method: Option<String>,

        /// Which side of the call the payload belongs to
        #[arg(long, default_value = "request")]
        direction: Direction,

        #[command(flatten)]
        descriptor: DescriptorOpts,

        #[command(flatten)]
        payload: PayloadOpts,

        #[command(flatten)]
        json: JsonOpts,
    },

    /// List services and methods in a descriptor set, or describe one method
    Describe {
        #[command(flatten)]
        descriptor: DescriptorOpts,

        /// Method path to describe
        #[arg(long, env = "PB_METHOD_PATH")]
        method: Option<String>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Run the gateway callout against a TOML flow file
    Callout {
        /// Flow file with [properties], [variables] and [messages]
        #[arg(long, value_name = "PATH")]
        flow: PathBuf,

        #[command(flatten)]
        json: JsonOpts,
    },
}

fn main() -> anyhow::Result<()> {
    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

fn run() -> anyhow::Result<()> {
    // Initialize tracing; stdout is reserved for decoded output
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            method,
            direction,
            descriptor,
            payload,
            json,
        } => run_decode(method, direction, descriptor, payload, json),
        Commands::Describe {
            descriptor,
            method,
            json,
        } => run_describe(descriptor, method, json),
        Commands::Callout { flow, json } => run_callout(flow, json),
    }
}

fn run_decode(
    method: Option<String>,
    direction: Direction,
    descriptor: DescriptorOpts,
    payload: PayloadOpts,
    json: JsonOpts,
) -> anyhow::Result<()> {
    let descriptor_set = load_descriptor_set(&descriptor)?;
    let method = method.unwrap_or_default();

    // Without a usable schema, fall back to the wire-level dump.
    let schema = if descriptor.is_empty() && method.is_empty() {
        None
    } else {
        match resolve_method(descriptor_set.as_deref(), &method) {
            Ok(schema) => Some(schema),
            Err(e) => {
                tracing::warn!("could not find protobuf service/method. {e}");
                None
            }
        }
    };

    let payload = read_payload(&payload)?;
    let message = schema.as_ref().map(|s| s.message_for(direction));
    let decoded = decode_payload(&payload, message, &JsonOptions::from(&json))
        .context("could not decode protobuf")?;

    if let Some(length) = decoded.message_length {
        tracing::info!("message-length: {length}");
    }
    tracing::debug!("Decoded as {}", decoded.format);

    print!("{}", decoded.text);
    if !decoded.text.is_empty() && !decoded.text.ends_with('\n') {
        println!();
    }
    Ok(())
}

#[derive(Serialize)]
struct MethodSummary {
    service: String,
    method: String,
    input: String,
    output: String,
    client_streaming: bool,
    server_streaming: bool,
    file: String,
}

impl From<&MethodSchema> for MethodSummary {
    fn from(schema: &MethodSchema) -> Self {
        Self {
            service: schema.service_name.clone(),
            method: schema.method_name.clone(),
            input: schema.input.full_name().to_string(),
            output: schema.output.full_name().to_string(),
            client_streaming: schema.client_streaming,
            server_streaming: schema.server_streaming,
            file: schema.file.proto().name().to_string(),
        }
    }
}

fn run_describe(
    descriptor: DescriptorOpts,
    method: Option<String>,
    json: bool,
) -> anyhow::Result<()> {
    let bytes = load_descriptor_set(&descriptor)?.context(
        "No descriptor set given (use --descriptor-set, --descriptor-base64 or --proto)",
    )?;
    let index = DescriptorIndex::from_bytes(&bytes)?;

    let summaries = match method.as_deref().filter(|m| !m.is_empty()) {
        Some(method) => vec![MethodSummary::from(&index.resolve(&MethodPath::parse(method)?)?)],
        None => {
            let mut summaries = Vec::new();
            for service in index.service_names() {
                let declared = index
                    .owner_of_service(service)
                    .and_then(|owner| owner.service.iter().find(|s| s.name() == service))
                    .with_context(|| format!("service {service} vanished from the index"))?;
                for rpc in &declared.method {
                    let path = MethodPath::parse(&format!("{service}/{}", rpc.name()))?;
                    summaries.push(MethodSummary::from(&index.resolve(&path)?));
                }
            }
            summaries
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    for s in &summaries {
        let stream = |streaming: bool| if streaming { "stream " } else { "" };
        println!(
            "{}/{}({}{}) returns ({}{})  [{}]",
            s.service,
            s.method,
            stream(s.client_streaming),
            s.input,
            stream(s.server_streaming),
            s.output,
            s.file
        );
    }
    Ok(())
}

fn run_callout(flow: PathBuf, json: JsonOpts) -> anyhow::Result<()> {
    let flow = FlowFile::from_file(&flow)?;
    let decoder = ProtobufDecoder::new(flow.config()?).with_json_options(JsonOptions::from(&json));
    let mut ctx = flow.to_context()?;

    let result = decoder.execute(&mut ctx);
    print!("{}", toml::to_string(ctx.variables())?);

    if result == ExecutionResult::Abort {
        anyhow::bail!("callout aborted");
    }
    Ok(())
}
