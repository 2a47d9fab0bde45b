//! Plugin host: drives a code generator over the linked graph.
//!
//! The host owns the graph and the output buffers; a [`Plugin`] only sees the
//! graph read-only and appends text to [`GeneratedFile`]s. Framing the request
//! and response on stdin/stdout is left to the caller.

use std::fmt;

use protograph_descriptor::{
    CodeGeneratorRequest, CodeGeneratorResponse, CompilerVersion, Edition, GeneratedFileContent,
};
use thiserror::Error;
use tracing::debug;

use crate::error::Result;
use crate::graph::{File, SchemaGraph};
use crate::registry::{BuildOptions, Registry};

#[derive(Debug, Error)]
pub enum PluginError {
    #[error("{file}: {message}")]
    Generate { file: String, message: String },

    #[error("formatting output: {0}")]
    Format(#[from] fmt::Error),
}

/// A code generator run once per file to generate.
pub trait Plugin {
    fn generate(
        &self,
        ctx: &mut GenerationContext<'_>,
        file: &File,
    ) -> std::result::Result<(), PluginError>;

    /// `CodeGeneratorResponse.Feature` bit set.
    fn supported_features(&self) -> u64 {
        0
    }

    /// Inclusive `(minimum, maximum)` edition range, if editions are supported.
    fn supported_editions(&self) -> Option<(Edition, Edition)> {
        None
    }
}

/// What a plugin gets while generating one file.
pub struct GenerationContext<'g> {
    graph: &'g SchemaGraph,
    parameter: Option<&'g str>,
    outputs: &'g mut Vec<GeneratedFile>,
}

impl<'g> GenerationContext<'g> {
    pub fn graph(&self) -> &'g SchemaGraph {
        self.graph
    }

    /// The request's `parameter` string (`--foo_opt=...`).
    pub fn parameter(&self) -> Option<&'g str> {
        self.parameter
    }

    /// Start a new output file; output order follows creation order.
    pub fn new_file(&mut self, name: impl Into<String>) -> &mut GeneratedFile {
        let index = self.outputs.len();
        self.outputs.push(GeneratedFile::new(name));
        &mut self.outputs[index]
    }
}

/// Append-only text buffer for one output file.
#[derive(Debug, Clone, Default)]
pub struct GeneratedFile {
    name: String,
    skip: bool,
    buf: String,
}

impl GeneratedFile {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            skip: false,
            buf: String::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Write `args` followed by a newline. Fails only if a `Display` impl
    /// inside `args` does.
    pub fn line(&mut self, args: fmt::Arguments<'_>) -> fmt::Result {
        fmt::Write::write_fmt(self, args)?;
        self.buf.push('\n');
        Ok(())
    }

    pub fn skip(&mut self) {
        self.skip = true;
    }

    pub fn unskip(&mut self) {
        self.skip = false;
    }

    pub fn is_skipped(&self) -> bool {
        self.skip
    }

    pub fn content(&self) -> &str {
        &self.buf
    }
}

impl fmt::Write for GeneratedFile {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.buf.push_str(s);
        Ok(())
    }
}

/// Linked graph plus everything needed to answer a generation request.
pub struct Generator {
    graph: SchemaGraph,
    parameter: Option<String>,
    compiler_version: Option<CompilerVersion>,
    outputs: Vec<GeneratedFile>,
    error: Option<PluginError>,
    supported_features: u64,
    supported_editions: Option<(Edition, Edition)>,
}

impl Generator {
    /// Build and link the request's files.
    pub fn new(request: &CodeGeneratorRequest, options: BuildOptions) -> Result<Self> {
        let graph = Registry::new(options).build_request(request)?;
        Ok(Self {
            graph,
            parameter: request.parameter.clone(),
            compiler_version: request.compiler_version.clone(),
            outputs: Vec::new(),
            error: None,
            supported_features: 0,
            supported_editions: None,
        })
    }

    pub fn graph(&self) -> &SchemaGraph {
        &self.graph
    }

    /// Run `plugin` over every file in request order, imports included; a
    /// plugin that only emits for requested files checks [`File::generate`].
    /// The first plugin error stops the run and is kept for [`Self::response`].
    pub fn generate_files<P: Plugin + ?Sized>(&mut self, plugin: &P) {
        self.supported_features = plugin.supported_features();
        self.supported_editions = plugin.supported_editions();

        for (_, file) in self.graph.files() {
            let mut ctx = GenerationContext {
                graph: &self.graph,
                parameter: self.parameter.as_deref(),
                outputs: &mut self.outputs,
            };
            if let Err(err) = plugin.generate(&mut ctx, file) {
                debug!(file = %file.path, error = %err, "plugin failed");
                self.error = Some(err);
                return;
            }
        }
    }

    pub fn error(&self) -> Option<&PluginError> {
        self.error.as_ref()
    }

    pub fn generated_files(&self) -> &[GeneratedFile] {
        &self.outputs
    }

    /// `v<major>.<minor>.<patch>[-<suffix>]`, or `(unknown)`.
    pub fn compiler_version(&self) -> String {
        format_compiler_version(self.compiler_version.as_ref())
    }

    pub fn response(&self) -> CodeGeneratorResponse {
        if let Some(err) = &self.error {
            return CodeGeneratorResponse {
                error: Some(err.to_string()),
                ..Default::default()
            };
        }

        let file = self
            .outputs
            .iter()
            .filter(|g| !g.is_skipped())
            .map(|g| GeneratedFileContent {
                name: g.name().to_string(),
                content: g.content().to_string(),
            })
            .collect();

        let (minimum_edition, maximum_edition) = match self.supported_editions {
            Some((min, max)) if min != Edition::Unknown && max != Edition::Unknown => {
                (Some(min.number()), Some(max.number()))
            }
            _ => (None, None),
        };

        CodeGeneratorResponse {
            error: None,
            supported_features: (self.supported_features > 0).then_some(self.supported_features),
            minimum_edition,
            maximum_edition,
            file,
        }
    }
}

pub fn format_compiler_version(version: Option<&CompilerVersion>) -> String {
    let Some(v) = version else {
        return "(unknown)".to_string();
    };
    let suffix = match v.suffix.as_deref() {
        Some(s) if !s.is_empty() => format!("-{s}"),
        _ => String::new(),
    };
    format!("v{}.{}.{}{}", v.major, v.minor, v.patch, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use protograph_descriptor::{DescriptorProto, FileDescriptorProto};

    struct ListMessages;

    impl Plugin for ListMessages {
        fn generate(
            &self,
            ctx: &mut GenerationContext<'_>,
            file: &File,
        ) -> std::result::Result<(), PluginError> {
            if !file.generate {
                return Ok(());
            }
            let graph = ctx.graph();
            let out = ctx.new_file(format!("{}.txt", file.path));
            for id in &file.messages {
                out.line(format_args!("{}", graph.message(*id).full_name))?;
            }
            if file.messages.is_empty() {
                out.skip();
            }
            Ok(())
        }

        fn supported_features(&self) -> u64 {
            1
        }

        fn supported_editions(&self) -> Option<(Edition, Edition)> {
            Some((Edition::Proto2, Edition::Edition2023))
        }
    }

    struct AlwaysFails;

    impl Plugin for AlwaysFails {
        fn generate(
            &self,
            _ctx: &mut GenerationContext<'_>,
            file: &File,
        ) -> std::result::Result<(), PluginError> {
            Err(PluginError::Generate {
                file: file.path.clone(),
                message: "unsupported".to_string(),
            })
        }
    }

    fn request() -> CodeGeneratorRequest {
        CodeGeneratorRequest {
            file_to_generate: vec!["a.proto".to_string(), "empty.proto".to_string()],
            proto_file: vec![
                FileDescriptorProto {
                    name: Some("a.proto".to_string()),
                    package: Some("a".to_string()),
                    message_type: vec![DescriptorProto {
                        name: Some("Bar".to_string()),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                FileDescriptorProto {
                    name: Some("empty.proto".to_string()),
                    ..Default::default()
                },
                FileDescriptorProto {
                    name: Some("dep.proto".to_string()),
                    ..Default::default()
                },
            ],
            compiler_version: Some(CompilerVersion {
                major: 3,
                minor: 21,
                patch: 12,
                suffix: Some("rc1".to_string()),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn response_lists_unskipped_outputs_and_capabilities() {
        let mut gen = Generator::new(&request(), BuildOptions::default()).expect("build");
        gen.generate_files(&ListMessages);

        assert_eq!(gen.generated_files().len(), 2);
        let resp = gen.response();
        assert_eq!(resp.error, None);
        assert_eq!(resp.supported_features, Some(1));
        assert_eq!(resp.minimum_edition, Some(998));
        assert_eq!(resp.maximum_edition, Some(1000));
        assert_eq!(resp.file.len(), 1);
        assert_eq!(resp.file[0].name, "a.proto.txt");
        assert_eq!(resp.file[0].content, "a.Bar\n");
    }

    #[test]
    fn imports_are_offered_to_the_plugin_in_request_order() {
        struct Manifest;

        impl Plugin for Manifest {
            fn generate(
                &self,
                ctx: &mut GenerationContext<'_>,
                file: &File,
            ) -> std::result::Result<(), PluginError> {
                let kind = if file.generate { "generate" } else { "import" };
                ctx.new_file(format!("{}.manifest", file.path))
                    .line(format_args!("{kind}"))?;
                Ok(())
            }
        }

        let mut gen = Generator::new(&request(), BuildOptions::default()).expect("build");
        gen.generate_files(&Manifest);
        let resp = gen.response();
        let files: Vec<(&str, &str)> = resp
            .file
            .iter()
            .map(|f| (f.name.as_str(), f.content.as_str()))
            .collect();
        assert_eq!(
            files,
            vec![
                ("a.proto.manifest", "generate\n"),
                ("empty.proto.manifest", "generate\n"),
                ("dep.proto.manifest", "import\n"),
            ]
        );
    }

    #[test]
    fn plugin_error_replaces_output() {
        let mut gen = Generator::new(&request(), BuildOptions::default()).expect("build");
        gen.generate_files(&AlwaysFails);
        let resp = gen.response();
        assert_eq!(resp.error.as_deref(), Some("a.proto: unsupported"));
        assert!(resp.file.is_empty());
        assert_eq!(resp.supported_features, None);
    }

    #[test]
    fn compiler_version_formatting() {
        let gen = Generator::new(&request(), BuildOptions::default()).expect("build");
        assert_eq!(gen.compiler_version(), "v3.21.12-rc1");
        assert_eq!(format_compiler_version(None), "(unknown)");
        let plain = CompilerVersion {
            major: 4,
            minor: 0,
            patch: 1,
            suffix: Some(String::new()),
        };
        assert_eq!(format_compiler_version(Some(&plain)), "v4.0.1");
    }

    #[test]
    fn fmt_write_appends_raw_text() {
        use std::fmt::Write as _;
        let mut out = GeneratedFile::new("x.txt");
        write!(out, "a").expect("write");
        out.line(format_args!("b{}", 1)).expect("line");
        assert_eq!(out.content(), "ab1\n");
        out.skip();
        assert!(out.is_skipped());
        out.unskip();
        assert!(!out.is_skipped());
    }

    struct Unprintable;

    impl fmt::Display for Unprintable {
        fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
            Err(fmt::Error)
        }
    }

    struct PrintsUnprintable;

    impl Plugin for PrintsUnprintable {
        fn generate(
            &self,
            ctx: &mut GenerationContext<'_>,
            _file: &File,
        ) -> std::result::Result<(), PluginError> {
            let out = ctx.new_file("broken.txt");
            out.line(format_args!("{}", Unprintable))?;
            Ok(())
        }
    }

    #[test]
    fn display_errors_inside_a_line_reach_the_response() {
        let mut gen = Generator::new(&request(), BuildOptions::default()).expect("build");
        gen.generate_files(&PrintsUnprintable);

        assert!(matches!(gen.error(), Some(PluginError::Format(_))));
        let response = gen.response();
        assert!(response.file.is_empty());
        assert!(response
            .error
            .as_deref()
            .is_some_and(|e| e.starts_with("formatting output")));
    }
}
