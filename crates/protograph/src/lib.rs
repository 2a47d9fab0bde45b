//! protograph: the front end of a protobuf code generator.
//!
//! Turns the flat, already-decoded descriptors of a generation request into a
//! single linked graph:
//!
//! - every declaration is a node in a [`SchemaGraph`] arena, owned by its file
//!   or enclosing message and addressed by a typed handle;
//! - every cross-reference (field → enum/message, extension → extendee,
//!   method → input/output, field ↔ oneof) is a handle into the same graph;
//! - every node carries its [`Location`] (the `SourceCodeInfo` path) and the
//!   [`CommentSet`] found at exactly that path.
//!
//! Building is two-phase. All files are built first, registering enums and
//! messages by full name; only then is every reference resolved, so forward and
//! cross-file references need no ordering. The first error aborts the build.
//!
//! ```no_run
//! use protograph::{BuildOptions, Registry};
//! # fn run(request: protograph::descriptor::CodeGeneratorRequest) -> protograph::Result<()> {
//! let graph = Registry::new(BuildOptions::default()).build_request(&request)?;
//! for (_, file) in graph.files_to_generate() {
//!     for id in &file.messages {
//!         let message = graph.message(*id);
//!         print!("{}", message.comments.leading);
//!         println!("message {}", message.full_name);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

mod build;
pub mod comments;
pub mod error;
pub mod graph;
pub mod location;
mod names;
pub mod plugin;
pub mod registry;
mod resolve;

pub use comments::{CommentIndex, CommentSet, Comments};
pub use error::{GraphError, Result};
pub use graph::{
    Enum, EnumId, EnumValue, EnumValueId, Field, FieldId, FieldKind, FieldRole, File, FileId,
    Message, MessageId, Method, MethodId, Oneof, OneofId, ScalarType, SchemaGraph, Service,
    ServiceId, Syntax, TypeLink,
};
pub use location::{Location, PathTag, SourcePath};
pub use plugin::{GeneratedFile, GenerationContext, Generator, Plugin, PluginError};
pub use registry::{build_graph, BuildOptions, DuplicateNamePolicy, Registry};

pub use protograph_descriptor as descriptor;
