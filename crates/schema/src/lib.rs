//! Descriptor graph linking and gRPC method resolution.
//!
//! This crate turns a serialized `FileDescriptorSet` plus a method path such as
//! `example.package.ServiceName/MethodName` into runtime message descriptors
//! without any generated code:
//!
//! - [`builder`] - depth-first linking of file descriptors with a per-call cache
//! - [`resolver`] - method path parsing, descriptor set indexing, method lookup
//! - [`testing`] - programmatic descriptor fixtures used by tests across the workspace

pub mod builder;
pub mod resolver;
pub mod testing;

pub use builder::{build, build_file, BuildCache};
pub use resolver::{resolve_method, DescriptorIndex, MethodPath, MethodSchema};
