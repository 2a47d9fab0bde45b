//! Registry: two-phase build of a request's file set.

use protograph_descriptor::{CodeGeneratorRequest, FileDescriptorProto};
use tracing::{debug, info};

use crate::build::FileBuilder;
use crate::error::{GraphError, Result};
use crate::graph::SchemaGraph;
use crate::resolve::Resolver;

/// What to do when two declarations share a full name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DuplicateNamePolicy {
    /// Fail the build with [`GraphError::DuplicateName`].
    #[default]
    Reject,
    /// Keep the later registration (logged at `warn`).
    Overwrite,
}

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    pub duplicate_names: DuplicateNamePolicy,
}

/// Builds and links a [`SchemaGraph`] from flat descriptors.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    options: BuildOptions,
}

impl Registry {
    pub fn new(options: BuildOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    /// Build from a plugin request (`proto_file` + `file_to_generate`).
    pub fn build_request(&self, request: &CodeGeneratorRequest) -> Result<SchemaGraph> {
        self.build(&request.proto_file, &request.file_to_generate)
    }

    /// Build every file in input order, mark the files to generate, then link.
    ///
    /// Stops at the first error; no partial graph is returned.
    pub fn build(
        &self,
        files: &[FileDescriptorProto],
        to_generate: &[String],
    ) -> Result<SchemaGraph> {
        let mut graph = self.build_unlinked(files, to_generate)?;

        let ids: Vec<_> = graph.files().map(|(id, _)| id).collect();
        let mut resolver = Resolver::new(&mut graph);
        for id in ids {
            resolver.resolve_file(id)?;
        }

        info!(
            files = graph.file_count(),
            generate = graph.files_to_generate().count(),
            "schema graph linked"
        );
        Ok(graph)
    }

    /// Build phase only: every node exists, no type reference is resolved.
    pub(crate) fn build_unlinked(
        &self,
        files: &[FileDescriptorProto],
        to_generate: &[String],
    ) -> Result<SchemaGraph> {
        let mut graph = SchemaGraph::default();

        for desc in files {
            let path = desc.name();
            if graph.file_by_path(path).is_some() {
                return Err(GraphError::DuplicateFile {
                    path: path.to_string(),
                });
            }

            let id = FileBuilder::build(&mut graph, &self.options, desc)?;
            graph.register_file(path, id);

            let file = graph.file(id);
            debug!(
                file = path,
                enums = file.enums.len(),
                messages = file.messages.len(),
                extensions = file.extensions.len(),
                services = file.services.len(),
                "built file"
            );
        }

        for path in to_generate {
            let id = graph
                .file_by_path(path)
                .ok_or_else(|| GraphError::UnknownFileToGenerate { path: path.clone() })?;
            graph.file_mut(id).generate = true;
        }

        Ok(graph)
    }
}

/// Build with default options.
pub fn build_graph(files: &[FileDescriptorProto], to_generate: &[String]) -> Result<SchemaGraph> {
    Registry::default().build(files, to_generate)
}
