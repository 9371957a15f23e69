//! Descriptor graph builder.
//!
//! Links a `FileDescriptorProto` against its dependencies, depth first, so that
//! every type reference resolves to a runtime descriptor. Each file is linked at
//! most once per [`BuildCache`], which makes diamond-shaped import graphs cheap.

use pb_decoder_types::{DecoderError, Result};
use protobuf::descriptor::FileDescriptorProto;
use protobuf::reflect::FileDescriptor;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Memo of linked files, scoped to one top-level resolution.
///
/// Create one per resolution and drop it afterwards; it is never shared
/// between calls.
#[derive(Default)]
pub struct BuildCache {
    built: HashMap<String, FileDescriptor>,
    in_progress: HashSet<String>,
    links: usize,
}

impl BuildCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get an already linked file by name.
    pub fn get(&self, name: &str) -> Option<&FileDescriptor> {
        self.built.get(name)
    }

    pub fn len(&self) -> usize {
        self.built.len()
    }

    pub fn is_empty(&self) -> bool {
        self.built.is_empty()
    }

    /// Number of link operations performed through this cache.
    pub fn links_performed(&self) -> usize {
        self.links
    }
}

/// Link `file` and, recursively, every file it imports.
///
/// Dependencies are looked up by name in `files_by_name` and linked in the
/// order the file lists them. Fails with `MissingDependency` when an import is
/// not in the map and with `InvalidSchema` when linking fails or the imports
/// form a cycle.
pub fn build_file(
    file: &FileDescriptorProto,
    files_by_name: &HashMap<String, FileDescriptorProto>,
    cache: &mut BuildCache,
) -> Result<FileDescriptor> {
    let name = file.name();
    if let Some(linked) = cache.built.get(name) {
        debug!("Reusing linked descriptor for {}", name);
        return Ok(linked.clone());
    }

    if !cache.in_progress.insert(name.to_string()) {
        return Err(DecoderError::InvalidSchema {
            file: name.to_string(),
            reason: "import cycle detected".to_string(),
        });
    }

    let linked = link_with_dependencies(file, files_by_name, cache);
    cache.in_progress.remove(name);
    let linked = linked?;

    cache.links += 1;
    cache.built.insert(name.to_string(), linked.clone());
    Ok(linked)
}

/// Link `file` with a fresh cache.
pub fn build(
    file: &FileDescriptorProto,
    files_by_name: &HashMap<String, FileDescriptorProto>,
) -> Result<FileDescriptor> {
    build_file(file, files_by_name, &mut BuildCache::new())
}

fn link_with_dependencies(
    file: &FileDescriptorProto,
    files_by_name: &HashMap<String, FileDescriptorProto>,
    cache: &mut BuildCache,
) -> Result<FileDescriptor> {
    let mut dependencies = Vec::with_capacity(file.dependency.len());
    for dependency in &file.dependency {
        let dependency_proto =
            files_by_name
                .get(dependency)
                .ok_or_else(|| DecoderError::MissingDependency {
                    file: file.name().to_string(),
                    dependency: dependency.clone(),
                })?;
        dependencies.push(build_file(dependency_proto, files_by_name, cache)?);
    }

    debug!(
        "Linking {} against {} dependencies",
        file.name(),
        dependencies.len()
    );
    FileDescriptor::new_dynamic(file.clone(), &dependencies).map_err(|e| {
        DecoderError::InvalidSchema {
            file: file.name().to_string(),
            reason: e.to_string(),
        }
    })
}
