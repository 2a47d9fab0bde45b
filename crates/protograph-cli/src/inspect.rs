//! `inspect` and `comments` commands.

use anyhow::{anyhow, Result};
use colored::Colorize;
use protograph::{
    BuildOptions, CommentSet, EnumId, FieldKind, FieldRole, MessageId, Registry, SchemaGraph,
};
use std::path::Path;

use crate::request::load_request;

pub fn cmd_inspect(request_path: &Path, generate: &[String], options: BuildOptions) -> Result<()> {
    let request = load_request(request_path, generate)?;
    let graph = Registry::new(options).build_request(&request)?;

    for (_, file) in graph.files() {
        let marker = if file.generate {
            "generate".green().bold()
        } else {
            "import".dimmed()
        };
        println!(
            "{} {} [{}] package={}",
            "file".cyan(),
            file.path.bold(),
            marker,
            if file.package.is_empty() { "-" } else { file.package.as_str() },
        );
        println!("  syntax={}", file.syntax.as_str());

        for id in &file.enums {
            print_enum(&graph, *id, 1);
        }
        for id in &file.messages {
            print_message(&graph, *id, 1);
        }
        for id in &file.extensions {
            println!("  {}", describe_field(&graph, graph.field(*id)));
        }
        for id in &file.services {
            let service = graph.service(*id);
            println!("  {} {}", "service".cyan(), service.full_name.bold());
            for m in &service.methods {
                let method = graph.method(*m);
                let input = method
                    .input
                    .target()
                    .map(|t| graph.message(t).full_name.as_str())
                    .unwrap_or("?");
                let output = method
                    .output
                    .target()
                    .map(|t| graph.message(t).full_name.as_str())
                    .unwrap_or("?");
                println!(
                    "    rpc {}({}{}) returns ({}{})",
                    method.name,
                    if method.client_streaming { "stream " } else { "" },
                    input,
                    if method.server_streaming { "stream " } else { "" },
                    output
                );
            }
        }
    }

    Ok(())
}

fn print_enum(graph: &SchemaGraph, id: EnumId, depth: usize) {
    let indent = "  ".repeat(depth);
    let e = graph.enum_(id);
    println!("{indent}{} {}", "enum".cyan(), e.full_name.bold());
    for v in &e.values {
        let value = graph.enum_value(*v);
        println!("{indent}  {} = {}", value.name, value.number);
    }
}

fn print_message(graph: &SchemaGraph, id: MessageId, depth: usize) {
    let indent = "  ".repeat(depth);
    let msg = graph.message(id);
    println!("{indent}{} {}", "message".cyan(), msg.full_name.bold());

    for e in &msg.enums {
        print_enum(graph, *e, depth + 1);
    }
    for m in &msg.messages {
        print_message(graph, *m, depth + 1);
    }
    for f in &msg.fields {
        println!("{indent}  {}", describe_field(graph, graph.field(*f)));
    }
    for x in &msg.extensions {
        println!("{indent}  {}", describe_field(graph, graph.field(*x)));
    }
}

fn describe_field(graph: &SchemaGraph, field: &protograph::Field) -> String {
    let ty = match &field.kind {
        FieldKind::Scalar(s) => s.as_str().to_string(),
        FieldKind::Enum(link) => match link.target() {
            Some(t) => format!("enum {}", graph.enum_(t).full_name),
            None => format!("enum {} (unresolved)", link.name()),
        },
        FieldKind::Message(link) | FieldKind::Group(link) => match link.target() {
            Some(t) => graph.message(t).full_name.clone(),
            None => format!("{} (unresolved)", link.name()),
        },
    };

    let mut out = format!("{} {} = {}", ty, field.name, field.number);
    if field.is_repeated() {
        out = format!("repeated {out}");
    }
    match &field.role {
        FieldRole::Member { oneof: Some(o) } => {
            out.push_str(&format!(" (oneof {})", graph.oneof(*o).name));
        }
        FieldRole::Member { oneof: None } => {}
        FieldRole::Extension { extendee } => {
            out = format!("extend {} {{ {out} }}", extendee.name());
        }
    }
    out
}

pub fn cmd_comments(request_path: &Path, full_name: &str, options: BuildOptions) -> Result<()> {
    let request = load_request(request_path, &[])?;
    let graph = Registry::new(options).build_request(&request)?;

    let (location, comments) = if let Some(id) = graph.message_by_name(full_name) {
        let m = graph.message(id);
        (&m.location, &m.comments)
    } else if let Some(id) = graph.enum_by_name(full_name) {
        let e = graph.enum_(id);
        (&e.location, &e.comments)
    } else {
        return Err(anyhow!("no message or enum named {full_name}"));
    };

    println!(
        "{} {} {}",
        full_name.bold(),
        location.source_file,
        location.path.to_string().dimmed()
    );
    print_comments(comments);
    Ok(())
}

fn print_comments(comments: &CommentSet) {
    if comments.is_empty() {
        println!("  {}", "(no comments)".dimmed());
        return;
    }
    for detached in &comments.leading_detached {
        print!("{detached}");
        println!();
    }
    print!("{}", comments.leading);
    if !comments.trailing.is_empty() {
        println!("{}", "trailing:".dimmed());
        print!("{}", comments.trailing);
    }
}
