//! Descriptor bundle loading.

use crate::DescriptorOpts;
use anyhow::Context;
use base64::Engine;
use protobuf::descriptor::FileDescriptorSet;
use protobuf::Message;
use std::path::{Path, PathBuf};

/// Load the serialized `FileDescriptorSet` selected by `opts`.
///
/// Returns `None` when no source was given, which callers treat as
/// "decode without a schema".
pub fn load_descriptor_set(opts: &DescriptorOpts) -> anyhow::Result<Option<Vec<u8>>> {
    if let Some(path) = &opts.descriptor_set {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read descriptor set from {path:?}"))?;
        tracing::debug!("Loaded {} byte descriptor set from {path:?}", bytes.len());
        return Ok(Some(bytes));
    }

    if let Some(encoded) = opts.descriptor_base64.as_deref().filter(|s| !s.is_empty()) {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .context("Descriptor set is not valid base64")?;
        return Ok(Some(bytes));
    }

    if !opts.protos.is_empty() {
        return compile_protos(&opts.protos, &opts.includes).map(Some);
    }

    Ok(None)
}

/// Compile `.proto` sources into a serialized `FileDescriptorSet`.
///
/// Imports are resolved against `includes`; when none are given, the parent
/// directory of every input is used. The set contains the inputs and all of
/// their transitive imports.
pub fn compile_protos(protos: &[PathBuf], includes: &[PathBuf]) -> anyhow::Result<Vec<u8>> {
    let mut parser = protobuf_parse::Parser::new();
    parser.pure();
    parser.inputs(protos);

    if includes.is_empty() {
        let mut parents: Vec<&Path> = Vec::new();
        for proto in protos {
            let parent = proto.parent().unwrap_or_else(|| Path::new("."));
            if !parents.contains(&parent) {
                parents.push(parent);
            }
        }
        parser.includes(parents);
    } else {
        parser.includes(includes);
    }

    let parsed = parser
        .parse_and_typecheck()
        .map_err(|e| anyhow::anyhow!("Failed to compile .proto sources: {e}"))?;
    tracing::debug!(
        "Compiled {} file(s) ({} with imports)",
        protos.len(),
        parsed.file_descriptors.len()
    );

    let mut set = FileDescriptorSet::new();
    set.file = parsed.file_descriptors;
    set.write_to_bytes()
        .context("Failed to serialize compiled descriptor set")
}
