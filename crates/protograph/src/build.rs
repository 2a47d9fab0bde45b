//! Build phase: flat descriptors → nodes.
//!
//! One [`FileBuilder`] per file allocates every declaration, computes its
//! location and comments, and registers enums/messages by full name. The only
//! wiring done here is local to a message (field ↔ oneof). Anything that needs
//! a by-name lookup is left as an unresolved [`TypeLink`] for the link phase.

use protograph_descriptor::{
    DescriptorProto, Edition, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FieldType, FileDescriptorProto, MethodDescriptorProto, OneofDescriptorProto,
    ServiceDescriptorProto,
};
use tracing::{trace, warn};

use crate::comments::CommentIndex;
use crate::error::{GraphError, Result};
use crate::graph::{
    Enum, EnumId, EnumValue, EnumValueId, Field, FieldId, FieldKind, FieldRole, File, FileId,
    Message, MessageId, Method, MethodId, Oneof, OneofId, ScalarType, SchemaGraph, Service,
    ServiceId, Syntax, TypeLink,
};
use crate::location::{Location, PathTag};
use crate::names::{enum_value_scope, qualify};
use crate::registry::{BuildOptions, DuplicateNamePolicy};

pub(crate) struct FileBuilder<'a> {
    graph: &'a mut SchemaGraph,
    options: &'a BuildOptions,
    comments: CommentIndex,
    file: FileId,
    path: String,
    package: String,
}

impl<'a> FileBuilder<'a> {
    /// Build one file's tree into `graph`. The file is not registered by path;
    /// that is the registry's call.
    pub(crate) fn build(
        graph: &'a mut SchemaGraph,
        options: &'a BuildOptions,
        desc: &FileDescriptorProto,
    ) -> Result<FileId> {
        let path = desc.name().to_string();
        let file = graph.push_file(File {
            path: path.clone(),
            package: desc.package().to_string(),
            syntax: syntax_of(desc),
            dependencies: desc.dependency.clone(),
            enums: Vec::new(),
            messages: Vec::new(),
            extensions: Vec::new(),
            services: Vec::new(),
            location: Location::file(path.as_str()),
            generate: false,
        });

        let mut builder = FileBuilder {
            graph,
            options,
            comments: CommentIndex::new(desc.source_code_info.as_ref()),
            file,
            path,
            package: desc.package().to_string(),
        };
        let root = builder.graph.file(file).location.clone();

        let mut enums = Vec::with_capacity(desc.enum_type.len());
        for (i, e) in desc.enum_type.iter().enumerate() {
            let loc = root.child(PathTag::FileEnum, i);
            let scope = builder.package.clone();
            enums.push(builder.build_enum(None, &scope, loc, e)?);
        }

        let mut messages = Vec::with_capacity(desc.message_type.len());
        for (i, m) in desc.message_type.iter().enumerate() {
            let loc = root.child(PathTag::FileMessage, i);
            let scope = builder.package.clone();
            messages.push(builder.build_message(None, &scope, loc, m)?);
        }

        let mut extensions = Vec::with_capacity(desc.extension.len());
        for (i, x) in desc.extension.iter().enumerate() {
            let loc = root.child(PathTag::FileExtension, i);
            let scope = builder.package.clone();
            extensions.push(builder.build_field(None, &scope, loc, x, true)?);
        }

        let mut services = Vec::with_capacity(desc.service.len());
        for (i, s) in desc.service.iter().enumerate() {
            let loc = root.child(PathTag::FileService, i);
            services.push(builder.build_service(loc, s)?);
        }

        let node = builder.graph.file_mut(file);
        node.enums = enums;
        node.messages = messages;
        node.extensions = extensions;
        node.services = services;
        Ok(file)
    }

    fn build_enum(
        &mut self,
        parent: Option<MessageId>,
        scope: &str,
        location: Location,
        desc: &EnumDescriptorProto,
    ) -> Result<EnumId> {
        let name = required_name(desc.name.as_deref(), scope, "enum", &location)?;
        let full_name = qualify(scope, name);
        let comments = self.comments.lookup(&location.path);

        self.check_name(&full_name)?;
        let id = self.graph.push_enum(Enum {
            name: name.to_string(),
            full_name: full_name.clone(),
            file: self.file,
            parent,
            values: Vec::with_capacity(desc.value.len()),
            location: location.clone(),
            comments,
        });
        self.graph.register_enum(&full_name, id);
        trace!(name = %full_name, "registered enum");

        let value_scope = enum_value_scope(&full_name).to_string();
        let mut values = Vec::with_capacity(desc.value.len());
        for (i, v) in desc.value.iter().enumerate() {
            let loc = location.child(PathTag::EnumValue, i);
            values.push(self.build_enum_value(id, &value_scope, loc, v)?);
        }
        self.graph.enum_mut(id).values = values;
        Ok(id)
    }

    fn build_enum_value(
        &mut self,
        parent: EnumId,
        scope: &str,
        location: Location,
        desc: &EnumValueDescriptorProto,
    ) -> Result<EnumValueId> {
        let name = required_name(desc.name.as_deref(), scope, "enum value", &location)?;
        let comments = self.comments.lookup(&location.path);
        Ok(self.graph.push_enum_value(EnumValue {
            name: name.to_string(),
            full_name: qualify(scope, name),
            number: desc.number.unwrap_or_default(),
            parent,
            location,
            comments,
        }))
    }

    fn build_message(
        &mut self,
        parent: Option<MessageId>,
        scope: &str,
        location: Location,
        desc: &DescriptorProto,
    ) -> Result<MessageId> {
        let name = required_name(desc.name.as_deref(), scope, "message", &location)?;
        let full_name = qualify(scope, name);
        let comments = self.comments.lookup(&location.path);

        self.check_name(&full_name)?;
        let id = self.graph.push_message(Message {
            name: name.to_string(),
            full_name: full_name.clone(),
            file: self.file,
            parent,
            fields: Vec::new(),
            oneofs: Vec::new(),
            enums: Vec::new(),
            messages: Vec::new(),
            extensions: Vec::new(),
            location: location.clone(),
            comments,
        });
        self.graph.register_message(&full_name, id);
        trace!(name = %full_name, "registered message");

        let mut enums = Vec::with_capacity(desc.enum_type.len());
        for (i, e) in desc.enum_type.iter().enumerate() {
            let loc = location.child(PathTag::MessageEnum, i);
            enums.push(self.build_enum(Some(id), &full_name, loc, e)?);
        }

        let mut messages = Vec::with_capacity(desc.nested_type.len());
        for (i, m) in desc.nested_type.iter().enumerate() {
            let loc = location.child(PathTag::MessageNested, i);
            messages.push(self.build_message(Some(id), &full_name, loc, m)?);
        }

        let mut fields = Vec::with_capacity(desc.field.len());
        for (i, f) in desc.field.iter().enumerate() {
            let loc = location.child(PathTag::MessageField, i);
            fields.push(self.build_field(Some(id), &full_name, loc, f, false)?);
        }

        let mut oneofs = Vec::with_capacity(desc.oneof_decl.len());
        for (i, o) in desc.oneof_decl.iter().enumerate() {
            let loc = location.child(PathTag::MessageOneof, i);
            oneofs.push(self.build_oneof(id, &full_name, loc, o)?);
        }

        let mut extensions = Vec::with_capacity(desc.extension.len());
        for (i, x) in desc.extension.iter().enumerate() {
            let loc = location.child(PathTag::MessageExtension, i);
            extensions.push(self.build_field(Some(id), &full_name, loc, x, true)?);
        }

        // Local field <-> oneof wiring.
        for (field_id, field_desc) in fields.iter().zip(&desc.field) {
            let Some(index) = field_desc.oneof_index else {
                continue;
            };
            let oneof_id = usize::try_from(index)
                .ok()
                .and_then(|i| oneofs.get(i).copied())
                .ok_or_else(|| {
                    GraphError::invalid(
                        self.graph.field(*field_id).full_name.clone(),
                        format!(
                            "oneof index {index} out of range ({} oneofs declared)",
                            oneofs.len()
                        ),
                    )
                })?;
            self.graph.field_mut(*field_id).role = FieldRole::Member {
                oneof: Some(oneof_id),
            };
            self.graph.oneof_mut(oneof_id).fields.push(*field_id);
        }

        let node = self.graph.message_mut(id);
        node.enums = enums;
        node.messages = messages;
        node.fields = fields;
        node.oneofs = oneofs;
        node.extensions = extensions;
        Ok(id)
    }

    fn build_field(
        &mut self,
        parent: Option<MessageId>,
        scope: &str,
        location: Location,
        desc: &FieldDescriptorProto,
        is_extension: bool,
    ) -> Result<FieldId> {
        let name = required_name(desc.name.as_deref(), scope, "field", &location)?;
        let full_name = qualify(scope, name);

        let ty = desc
            .r#type
            .ok_or_else(|| GraphError::invalid(&full_name, "field has no type"))?;
        let kind = match ScalarType::from_field_type(ty) {
            Some(scalar) => FieldKind::Scalar(scalar),
            None => {
                let type_name = desc
                    .type_name
                    .as_deref()
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| GraphError::invalid(&full_name, "field has no type name"))?;
                match ty {
                    FieldType::Enum => FieldKind::Enum(TypeLink::unresolved(type_name)),
                    FieldType::Group => FieldKind::Group(TypeLink::unresolved(type_name)),
                    _ => FieldKind::Message(TypeLink::unresolved(type_name)),
                }
            }
        };

        let role = if is_extension {
            let extendee = desc
                .extendee
                .as_deref()
                .filter(|n| !n.is_empty())
                .ok_or_else(|| GraphError::invalid(&full_name, "extension has no extendee"))?;
            FieldRole::Extension {
                extendee: TypeLink::unresolved(extendee),
            }
        } else {
            FieldRole::Member { oneof: None }
        };

        let comments = self.comments.lookup(&location.path);
        Ok(self.graph.push_field(Field {
            name: name.to_string(),
            full_name,
            number: desc.number.unwrap_or_default(),
            label: desc.label.unwrap_or_default(),
            json_name: desc.json_name.clone(),
            proto3_optional: desc.proto3_optional.unwrap_or(false),
            file: self.file,
            parent,
            kind,
            role,
            location,
            comments,
        }))
    }

    fn build_oneof(
        &mut self,
        parent: MessageId,
        scope: &str,
        location: Location,
        desc: &OneofDescriptorProto,
    ) -> Result<OneofId> {
        let name = required_name(desc.name.as_deref(), scope, "oneof", &location)?;
        let comments = self.comments.lookup(&location.path);
        Ok(self.graph.push_oneof(Oneof {
            name: name.to_string(),
            full_name: qualify(scope, name),
            parent,
            fields: Vec::new(),
            location,
            comments,
        }))
    }

    fn build_service(
        &mut self,
        location: Location,
        desc: &ServiceDescriptorProto,
    ) -> Result<ServiceId> {
        let scope = self.package.clone();
        let name = required_name(desc.name.as_deref(), &scope, "service", &location)?;
        let full_name = qualify(&scope, name);
        let comments = self.comments.lookup(&location.path);

        let id = self.graph.push_service(Service {
            name: name.to_string(),
            full_name: full_name.clone(),
            file: self.file,
            methods: Vec::with_capacity(desc.method.len()),
            location: location.clone(),
            comments,
        });

        let mut methods = Vec::with_capacity(desc.method.len());
        for (i, m) in desc.method.iter().enumerate() {
            let loc = location.child(PathTag::ServiceMethod, i);
            methods.push(self.build_method(id, &full_name, loc, m)?);
        }
        self.graph.service_mut(id).methods = methods;
        Ok(id)
    }

    fn build_method(
        &mut self,
        parent: ServiceId,
        scope: &str,
        location: Location,
        desc: &MethodDescriptorProto,
    ) -> Result<MethodId> {
        let name = required_name(desc.name.as_deref(), scope, "method", &location)?;
        let full_name = qualify(scope, name);
        let input = desc
            .input_type
            .as_deref()
            .ok_or_else(|| GraphError::invalid(&full_name, "method has no input type"))?;
        let output = desc
            .output_type
            .as_deref()
            .ok_or_else(|| GraphError::invalid(&full_name, "method has no output type"))?;

        let comments = self.comments.lookup(&location.path);
        Ok(self.graph.push_method(Method {
            name: name.to_string(),
            full_name,
            parent,
            input: TypeLink::unresolved(input),
            output: TypeLink::unresolved(output),
            client_streaming: desc.client_streaming.unwrap_or(false),
            server_streaming: desc.server_streaming.unwrap_or(false),
            location,
            comments,
        }))
    }

    /// Enforce the duplicate-name policy before `full_name` is registered.
    fn check_name(&self, full_name: &str) -> Result<()> {
        let Some(previous) = self.graph.declaring_file(full_name) else {
            return Ok(());
        };
        let first_file = self.graph.file(previous).path.clone();
        match self.options.duplicate_names {
            DuplicateNamePolicy::Reject => Err(GraphError::DuplicateName {
                name: full_name.to_string(),
                first_file,
                second_file: self.path.clone(),
            }),
            DuplicateNamePolicy::Overwrite => {
                warn!(
                    name = full_name,
                    first_file = %first_file,
                    second_file = %self.path,
                    "duplicate declaration; later one wins"
                );
                Ok(())
            }
        }
    }
}

fn syntax_of(desc: &FileDescriptorProto) -> Syntax {
    match desc.syntax.as_deref() {
        Some("proto3") => Syntax::Proto3,
        Some("editions") => Syntax::Editions(desc.edition.unwrap_or(Edition::Unknown)),
        _ => Syntax::Proto2,
    }
}

fn required_name<'d>(
    name: Option<&'d str>,
    scope: &str,
    what: &str,
    location: &Location,
) -> Result<&'d str> {
    name.filter(|n| !n.is_empty()).ok_or_else(|| {
        let owner = if scope.is_empty() {
            location.source_file.as_str()
        } else {
            scope
        };
        GraphError::invalid(owner, format!("{what} at {} has no name", location.path))
    })
}
