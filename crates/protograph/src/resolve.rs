//! Link phase: turn every by-name reference into a handle.
//!
//! Runs once, after every file of the request has been built, so forward and
//! cross-file references need no special treatment. Order inside a file is
//! depth-first through the message tree (own fields, nested messages, nested
//! extensions), then top-level extensions, then service methods. The order
//! only decides which error is reported first.

use crate::error::{GraphError, Result};
use crate::graph::{FieldId, FieldKind, FieldRole, FileId, MessageId, MethodId, SchemaGraph};

pub(crate) struct Resolver<'a> {
    graph: &'a mut SchemaGraph,
}

impl<'a> Resolver<'a> {
    pub(crate) fn new(graph: &'a mut SchemaGraph) -> Self {
        Self { graph }
    }

    pub(crate) fn resolve_file(&mut self, file: FileId) -> Result<()> {
        let node = self.graph.file(file);
        let messages = node.messages.clone();
        let extensions = node.extensions.clone();
        let services = node.services.clone();

        for message in messages {
            self.resolve_message(message)?;
        }
        for extension in extensions {
            self.resolve_field(extension)?;
        }
        for service in services {
            let methods = self.graph.service(service).methods.clone();
            for method in methods {
                self.resolve_method(method)?;
            }
        }
        Ok(())
    }

    fn resolve_message(&mut self, message: MessageId) -> Result<()> {
        let node = self.graph.message(message);
        let fields = node.fields.clone();
        let nested = node.messages.clone();
        let extensions = node.extensions.clone();

        for field in fields {
            self.resolve_field(field)?;
        }
        for message in nested {
            self.resolve_message(message)?;
        }
        for extension in extensions {
            self.resolve_field(extension)?;
        }
        Ok(())
    }

    fn resolve_field(&mut self, id: FieldId) -> Result<()> {
        let field = self.graph.field(id);

        let (enum_target, message_target) = match &field.kind {
            FieldKind::Scalar(_) => (None, None),
            FieldKind::Enum(link) => {
                let target = self.graph.enum_by_name(link.name()).ok_or_else(|| {
                    GraphError::UnresolvedEnum {
                        field: field.full_name.clone(),
                        enum_name: link.name().to_string(),
                    }
                })?;
                (Some(target), None)
            }
            FieldKind::Message(link) | FieldKind::Group(link) => {
                let target = self.graph.message_by_name(link.name()).ok_or_else(|| {
                    GraphError::UnresolvedMessage {
                        field: field.full_name.clone(),
                        message_name: link.name().to_string(),
                    }
                })?;
                (None, Some(target))
            }
        };

        let extendee_target = match &field.role {
            FieldRole::Member { .. } => None,
            FieldRole::Extension { extendee } => {
                let target = self.graph.message_by_name(extendee.name()).ok_or_else(|| {
                    GraphError::UnresolvedExtendee {
                        field: field.full_name.clone(),
                        extendee: extendee.name().to_string(),
                    }
                })?;
                Some(target)
            }
        };

        let field = self.graph.field_mut(id);
        match (&mut field.kind, enum_target, message_target) {
            (FieldKind::Enum(link), Some(target), _) => link.resolve(target),
            (FieldKind::Message(link) | FieldKind::Group(link), _, Some(target)) => {
                link.resolve(target)
            }
            _ => {}
        }
        if let (FieldRole::Extension { extendee }, Some(target)) = (&mut field.role, extendee_target)
        {
            extendee.resolve(target);
        }
        Ok(())
    }

    fn resolve_method(&mut self, id: MethodId) -> Result<()> {
        let method = self.graph.method(id);
        let lookup = |name: &str, is_input: bool| {
            self.graph
                .message_by_name(name)
                .ok_or_else(|| GraphError::UnresolvedMethodType {
                    method: method.full_name.clone(),
                    type_name: name.to_string(),
                    is_input,
                })
        };
        let input = lookup(method.input.name(), true)?;
        let output = lookup(method.output.name(), false)?;

        let method = self.graph.method_mut(id);
        method.input.resolve(input);
        method.output.resolve(output);
        Ok(())
    }
}
