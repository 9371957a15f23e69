//! Method resolution from gRPC-style paths.
//!
//! A path such as `/example.package.ServiceName/MethodName` names a service by
//! its package-qualified name and a method by its bare name. Resolution finds
//! the file that declares the service, links it with [`crate::builder`], and
//! returns the input and output message descriptors of the method.
//!
//! Services are matched by their short name (the last dot-delimited component).
//! When two files in the same set declare services with the same short name,
//! the file indexed last wins. This mirrors how the gateway callout has always
//! behaved; it is not a fully-qualified match.

use crate::builder::{build_file, BuildCache};
use pb_decoder_types::{DecoderError, Direction, Result};
use protobuf::descriptor::{FileDescriptorProto, FileDescriptorSet};
use protobuf::reflect::{FileDescriptor, MessageDescriptor};
use protobuf::Message;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// A parsed `<package.Service>/<Method>` path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodPath {
    /// Service reference as written in the path (e.g., "example.package.ServiceName")
    pub service_ref: String,
    /// Last dot-delimited component of `service_ref`
    pub service_name: String,
    pub method_name: String,
}

impl MethodPath {
    /// Parse a method path.
    ///
    /// Only the last two `/`-delimited segments matter, so both
    /// `pkg.Svc/Method` and `/pkg.Svc/Method` are accepted. Trailing empty
    /// segments are ignored, in the path and in the service reference.
    pub fn parse(path: &str) -> Result<Self> {
        if path.is_empty() {
            return Err(DecoderError::EmptyInput(
                "No request path provided".to_string(),
            ));
        }

        let invalid = |reason: &str| DecoderError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        };

        let segments = split_trimmed(path, '/');
        if segments.len() < 2 {
            return Err(invalid("expected at least 2 path segments"));
        }

        let method_name = segments[segments.len() - 1];
        let service_ref = segments[segments.len() - 2];

        let service_name = split_trimmed(service_ref, '.')
            .last()
            .copied()
            .unwrap_or_default();
        if service_name.is_empty() {
            return Err(invalid("service name is empty"));
        }

        Ok(Self {
            service_ref: service_ref.to_string(),
            service_name: service_name.to_string(),
            method_name: method_name.to_string(),
        })
    }
}

/// Split on `separator`, dropping trailing empty segments so `a/b/` reads as
/// `a/b`.
fn split_trimmed(s: &str, separator: char) -> Vec<&str> {
    let mut segments: Vec<&str> = s.split(separator).collect();
    while segments.last().is_some_and(|segment| segment.is_empty()) {
        segments.pop();
    }
    segments
}

impl fmt::Display for MethodPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service_ref, self.method_name)
    }
}

/// Input and output message schemas of one RPC method.
#[derive(Clone)]
pub struct MethodSchema {
    /// Linked file declaring the service
    pub file: FileDescriptor,
    /// Package-qualified service name
    pub service_name: String,
    pub method_name: String,
    pub input: MessageDescriptor,
    pub output: MessageDescriptor,
    pub client_streaming: bool,
    pub server_streaming: bool,
}

impl MethodSchema {
    /// Message schema for one side of the call.
    pub fn message_for(&self, direction: Direction) -> &MessageDescriptor {
        match direction {
            Direction::Request => &self.input,
            Direction::Response => &self.output,
        }
    }
}

impl fmt::Debug for MethodSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodSchema")
            .field("file", &self.file.proto().name())
            .field("service_name", &self.service_name)
            .field("method_name", &self.method_name)
            .field("input", &self.input.full_name())
            .field("output", &self.output.full_name())
            .field("client_streaming", &self.client_streaming)
            .field("server_streaming", &self.server_streaming)
            .finish()
    }
}

/// Lookup tables over one descriptor set: file name → file, and service short
/// name → owning file name.
#[derive(Debug, Clone, Default)]
pub struct DescriptorIndex {
    files_by_name: HashMap<String, FileDescriptorProto>,
    service_owners: HashMap<String, String>,
}

impl DescriptorIndex {
    pub fn from_set(set: FileDescriptorSet) -> Self {
        let mut index = Self::default();
        for file in set.file {
            for service in &file.service {
                index
                    .service_owners
                    .insert(service.name().to_string(), file.name().to_string());
            }
            index.files_by_name.insert(file.name().to_string(), file);
        }
        index
    }

    /// Decode a serialized `FileDescriptorSet` and index it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let set = FileDescriptorSet::parse_from_bytes(bytes).map_err(|e| {
            DecoderError::Decode(format!("invalid FileDescriptorSet: {e}"))
        })?;
        debug!("Decoded descriptor set with {} files", set.file.len());
        Ok(Self::from_set(set))
    }

    /// File declaring the service with this short name.
    pub fn owner_of_service(&self, service_name: &str) -> Option<&FileDescriptorProto> {
        self.service_owners
            .get(service_name)
            .and_then(|file| self.files_by_name.get(file))
    }

    /// Service short names, sorted.
    pub fn service_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.service_owners.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn file_count(&self) -> usize {
        self.files_by_name.len()
    }

    /// Link a file of this set (and its imports) with a fresh cache.
    pub fn link(&self, file: &FileDescriptorProto) -> Result<FileDescriptor> {
        build_file(file, &self.files_by_name, &mut BuildCache::new())
    }

    /// Resolve a parsed method path against this set.
    pub fn resolve(&self, path: &MethodPath) -> Result<MethodSchema> {
        let owner = self
            .owner_of_service(&path.service_name)
            .ok_or_else(|| DecoderError::ServiceNotFound(path.service_name.clone()))?;

        let file = self.link(owner)?;

        let service = file
            .services()
            .find(|s| s.proto().name() == path.service_name)
            .ok_or_else(|| DecoderError::ServiceNotFound(path.service_name.clone()))?;

        let method = service
            .methods()
            .find(|m| m.proto().name() == path.method_name)
            .ok_or_else(|| DecoderError::MethodNotFound {
                service: path.service_name.clone(),
                method: path.method_name.clone(),
            })?;

        let package = file.proto().package();
        let service_name = if package.is_empty() {
            path.service_name.clone()
        } else {
            format!("{package}.{}", path.service_name)
        };

        let schema = MethodSchema {
            service_name,
            method_name: path.method_name.clone(),
            input: method.input_type(),
            output: method.output_type(),
            client_streaming: method.proto().client_streaming(),
            server_streaming: method.proto().server_streaming(),
            file: file.clone(),
        };
        info!(
            "Resolved {}/{} ({} -> {})",
            schema.service_name,
            schema.method_name,
            schema.input.full_name(),
            schema.output.full_name()
        );
        Ok(schema)
    }
}

/// Resolve `method_path` against a serialized `FileDescriptorSet`.
///
/// Checks run in this order: descriptor present, path well formed, descriptor
/// decodable, service found, method found.
pub fn resolve_method(descriptor_set: Option<&[u8]>, method_path: &str) -> Result<MethodSchema> {
    let bytes = match descriptor_set {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => {
            return Err(DecoderError::EmptyInput(
                "No protobuf descriptor provided".to_string(),
            ))
        }
    };

    let path = MethodPath::parse(method_path)?;
    let index = DescriptorIndex::from_bytes(bytes)?;
    index.resolve(&path)
}
