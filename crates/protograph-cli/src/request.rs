//! Loading requests from disk.

use anyhow::{anyhow, Context, Result};
use protograph_descriptor::{CodeGeneratorRequest, FileDescriptorSet};
use serde_json::Value;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Read a `CodeGeneratorRequest` JSON, or a `FileDescriptorSet` JSON (as
/// written by `buf build --as-file-descriptor-set`) with every file marked for
/// generation. A non-empty `generate` list replaces `file_to_generate`.
pub fn load_request(path: &Path, generate: &[String]) -> Result<CodeGeneratorRequest> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read request json: {}", path.display()))?;
    let value: Value = serde_json::from_str(&text)
        .with_context(|| format!("failed to parse request json: {}", path.display()))?;

    let mut request = if value.get("protoFile").is_some() || value.get("fileToGenerate").is_some()
    {
        serde_json::from_value::<CodeGeneratorRequest>(value)?
    } else if value.get("file").is_some() {
        let set: FileDescriptorSet = serde_json::from_value(value)?;
        CodeGeneratorRequest {
            file_to_generate: set.file.iter().map(|f| f.name().to_string()).collect(),
            proto_file: set.file,
            ..Default::default()
        }
    } else {
        return Err(anyhow!(
            "{}: expected a CodeGeneratorRequest or FileDescriptorSet",
            path.display()
        ));
    };

    if !generate.is_empty() {
        request.file_to_generate = generate.to_vec();
    }
    debug!(
        path = %path.display(),
        files = request.proto_file.len(),
        generate = request.file_to_generate.len(),
        "loaded request"
    );
    Ok(request)
}
