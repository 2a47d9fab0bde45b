//! `outline` command: a small generator that lists declarations and their
//! leading comments, one `<file>.outline.txt` per generated file.

use anyhow::{Context, Result};
use colored::Colorize;
use protograph::plugin::{GenerationContext, PluginError};
use protograph::{BuildOptions, File, GeneratedFile, Generator, MessageId, Plugin, SchemaGraph};
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::request::load_request;

pub struct OutlinePlugin;

impl Plugin for OutlinePlugin {
    fn generate(&self, ctx: &mut GenerationContext<'_>, file: &File) -> Result<(), PluginError> {
        if !file.generate {
            return Ok(());
        }
        let graph = ctx.graph();
        let out = ctx.new_file(outline_name(&file.path));

        writeln!(out, "// {} ({})", file.path, file.syntax.as_str())?;
        if !file.package.is_empty() {
            writeln!(out, "package {};", file.package)?;
        }
        for id in &file.enums {
            let e = graph.enum_(*id);
            write!(out, "{}", e.comments.leading)?;
            writeln!(out, "enum {}", e.full_name)?;
        }
        for id in &file.messages {
            write_message(graph, out, *id, 0)?;
        }
        for id in &file.services {
            let service = graph.service(*id);
            write!(out, "{}", service.comments.leading)?;
            writeln!(out, "service {}", service.full_name)?;
            for m in &service.methods {
                let method = graph.method(*m);
                write!(out, "{}", method.comments.leading)?;
                writeln!(
                    out,
                    "  rpc {}({}) returns ({})",
                    method.name,
                    method.input.name(),
                    method.output.name()
                )?;
            }
        }
        Ok(())
    }
}

fn write_message(
    graph: &SchemaGraph,
    out: &mut GeneratedFile,
    id: MessageId,
    depth: usize,
) -> Result<(), PluginError> {
    let indent = "  ".repeat(depth);
    let msg = graph.message(id);
    for line in msg.comments.leading.to_string().lines() {
        writeln!(out, "{indent}{line}")?;
    }
    writeln!(out, "{indent}message {}", msg.full_name)?;
    for f in &msg.fields {
        let field = graph.field(*f);
        writeln!(out, "{indent}  {} = {}", field.name, field.number)?;
    }
    for m in &msg.messages {
        write_message(graph, out, *m, depth + 1)?;
    }
    Ok(())
}

fn outline_name(path: &str) -> String {
    let stem = path.strip_suffix(".proto").unwrap_or(path);
    format!("{stem}.outline.txt")
}

pub fn cmd_outline(
    request_path: &Path,
    out: Option<&PathBuf>,
    generate: &[String],
    options: BuildOptions,
) -> Result<()> {
    let request = load_request(request_path, generate)?;
    let mut generator = Generator::new(&request, options)?;
    generator.generate_files(&OutlinePlugin);

    let response = generator.response();
    let json = serde_json::to_string_pretty(&response)?;
    match out {
        Some(path) => {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(path, &json)
                .with_context(|| format!("failed to write response: {}", path.display()))?;
            eprintln!(
                "  {} {} ({} files, protoc {})",
                "→".cyan(),
                path.display(),
                response.file.len(),
                generator.compiler_version()
            );
        }
        None => println!("{json}"),
    }
    Ok(())
}
