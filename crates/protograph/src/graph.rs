//! The linked schema graph.
//!
//! All nodes live in per-kind arenas owned by [`SchemaGraph`] and refer to each
//! other through small copyable handles. Ownership edges (file → message →
//! field, ...) and cross-references (field → message, method → input, field ↔
//! oneof) are both plain handles, so cycles cost nothing.
//!
//! A graph handed out by [`crate::Registry`] is fully linked: every
//! [`TypeLink`] is resolved and nothing is mutated afterwards.

use ahash::AHashMap;
use protograph_descriptor::{Edition, FieldLabel, FieldType};

use crate::comments::CommentSet;
use crate::location::Location;

// ============================================================================
// Handles
// ============================================================================

macro_rules! node_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name(u32);

        impl $name {
            pub const fn raw(self) -> u32 {
                self.0
            }

            fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

node_id!(
    /// Handle of a [`File`].
    FileId
);
node_id!(
    /// Handle of an [`Enum`].
    EnumId
);
node_id!(EnumValueId);
node_id!(
    /// Handle of a [`Message`].
    MessageId
);
node_id!(
    /// Handle of a [`Field`] (regular field or extension).
    FieldId
);
node_id!(OneofId);
node_id!(ServiceId);
node_id!(MethodId);

/// A by-name reference to another node, resolved in the link phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeLink<I> {
    name: String,
    target: Option<I>,
}

impl<I: Copy> TypeLink<I> {
    /// `name` may carry protoc's leading `.`; it is stored without it.
    pub(crate) fn unresolved(name: &str) -> Self {
        Self {
            name: name.strip_prefix('.').unwrap_or(name).to_string(),
            target: None,
        }
    }

    /// Full name of the referenced declaration.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> Option<I> {
        self.target
    }

    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn resolve(&mut self, id: I) {
        debug_assert!(self.target.is_none(), "{} linked twice", self.name);
        self.target = Some(id);
    }
}

// ============================================================================
// Nodes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    Proto2,
    Proto3,
    Editions(Edition),
}

impl Syntax {
    pub fn as_str(&self) -> &'static str {
        match self {
            Syntax::Proto2 => "proto2",
            Syntax::Proto3 => "proto3",
            Syntax::Editions(_) => "editions",
        }
    }
}

/// A `.proto` source file.
#[derive(Debug, Clone)]
pub struct File {
    pub path: String,
    pub package: String,
    pub syntax: Syntax,
    /// Import paths, as listed in the file.
    pub dependencies: Vec<String>,

    pub enums: Vec<EnumId>,
    pub messages: Vec<MessageId>,
    pub extensions: Vec<FieldId>,
    pub services: Vec<ServiceId>,

    pub location: Location,
    /// True if the request asked for output for this file.
    pub generate: bool,
}

#[derive(Debug, Clone)]
pub struct Enum {
    pub name: String,
    pub full_name: String,
    pub file: FileId,
    /// Enclosing message; `None` at file scope.
    pub parent: Option<MessageId>,
    pub values: Vec<EnumValueId>,
    pub location: Location,
    pub comments: CommentSet,
}

#[derive(Debug, Clone)]
pub struct EnumValue {
    pub name: String,
    /// Enum values are scoped as siblings of their enum, not children.
    pub full_name: String,
    pub number: i32,
    pub parent: EnumId,
    pub location: Location,
    pub comments: CommentSet,
}

#[derive(Debug, Clone)]
pub struct Message {
    pub name: String,
    pub full_name: String,
    pub file: FileId,
    pub parent: Option<MessageId>,

    pub fields: Vec<FieldId>,
    pub oneofs: Vec<OneofId>,

    pub enums: Vec<EnumId>,
    pub messages: Vec<MessageId>,
    pub extensions: Vec<FieldId>,

    pub location: Location,
    pub comments: CommentSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    Double,
    Float,
    Int64,
    Uint64,
    Int32,
    Fixed64,
    Fixed32,
    Bool,
    String,
    Bytes,
    Uint32,
    Sfixed32,
    Sfixed64,
    Sint32,
    Sint64,
}

impl ScalarType {
    /// `None` for enum, message and group, which carry a type reference.
    pub fn from_field_type(ty: FieldType) -> Option<ScalarType> {
        let scalar = match ty {
            FieldType::Double => ScalarType::Double,
            FieldType::Float => ScalarType::Float,
            FieldType::Int64 => ScalarType::Int64,
            FieldType::Uint64 => ScalarType::Uint64,
            FieldType::Int32 => ScalarType::Int32,
            FieldType::Fixed64 => ScalarType::Fixed64,
            FieldType::Fixed32 => ScalarType::Fixed32,
            FieldType::Bool => ScalarType::Bool,
            FieldType::String => ScalarType::String,
            FieldType::Bytes => ScalarType::Bytes,
            FieldType::Uint32 => ScalarType::Uint32,
            FieldType::Sfixed32 => ScalarType::Sfixed32,
            FieldType::Sfixed64 => ScalarType::Sfixed64,
            FieldType::Sint32 => ScalarType::Sint32,
            FieldType::Sint64 => ScalarType::Sint64,
            FieldType::Enum | FieldType::Message | FieldType::Group => return None,
        };
        Some(scalar)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScalarType::Double => "double",
            ScalarType::Float => "float",
            ScalarType::Int64 => "int64",
            ScalarType::Uint64 => "uint64",
            ScalarType::Int32 => "int32",
            ScalarType::Fixed64 => "fixed64",
            ScalarType::Fixed32 => "fixed32",
            ScalarType::Bool => "bool",
            ScalarType::String => "string",
            ScalarType::Bytes => "bytes",
            ScalarType::Uint32 => "uint32",
            ScalarType::Sfixed32 => "sfixed32",
            ScalarType::Sfixed64 => "sfixed64",
            ScalarType::Sint32 => "sint32",
            ScalarType::Sint64 => "sint64",
        }
    }
}

/// What a field holds. Only reference kinds carry a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    Scalar(ScalarType),
    Enum(TypeLink<EnumId>),
    Message(TypeLink<MessageId>),
    Group(TypeLink<MessageId>),
}

/// Whether a field is a member of its message or extends another one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldRole {
    Member { oneof: Option<OneofId> },
    Extension { extendee: TypeLink<MessageId> },
}

#[derive(Debug, Clone)]
pub struct Field {
    pub name: String,
    pub full_name: String,
    pub number: i32,
    pub label: FieldLabel,
    pub json_name: Option<String>,
    pub proto3_optional: bool,
    pub file: FileId,
    /// Declaring message; `None` for top-level extensions.
    pub parent: Option<MessageId>,
    pub kind: FieldKind,
    pub role: FieldRole,
    pub location: Location,
    pub comments: CommentSet,
}

impl Field {
    pub fn is_extension(&self) -> bool {
        matches!(self.role, FieldRole::Extension { .. })
    }

    pub fn oneof(&self) -> Option<OneofId> {
        match self.role {
            FieldRole::Member { oneof } => oneof,
            FieldRole::Extension { .. } => None,
        }
    }

    pub fn extendee(&self) -> Option<MessageId> {
        match &self.role {
            FieldRole::Extension { extendee } => extendee.target(),
            FieldRole::Member { .. } => None,
        }
    }

    pub fn enum_type(&self) -> Option<EnumId> {
        match &self.kind {
            FieldKind::Enum(link) => link.target(),
            _ => None,
        }
    }

    /// Target of a message or group field.
    pub fn message_type(&self) -> Option<MessageId> {
        match &self.kind {
            FieldKind::Message(link) | FieldKind::Group(link) => link.target(),
            _ => None,
        }
    }

    pub fn is_repeated(&self) -> bool {
        self.label == FieldLabel::Repeated
    }
}

#[derive(Debug, Clone)]
pub struct Oneof {
    pub name: String,
    pub full_name: String,
    pub parent: MessageId,
    /// Member fields, in declaration order.
    pub fields: Vec<FieldId>,
    pub location: Location,
    pub comments: CommentSet,
}

#[derive(Debug, Clone)]
pub struct Service {
    pub name: String,
    pub full_name: String,
    pub file: FileId,
    pub methods: Vec<MethodId>,
    pub location: Location,
    pub comments: CommentSet,
}

#[derive(Debug, Clone)]
pub struct Method {
    pub name: String,
    pub full_name: String,
    pub parent: ServiceId,
    pub input: TypeLink<MessageId>,
    pub output: TypeLink<MessageId>,
    pub client_streaming: bool,
    pub server_streaming: bool,
    pub location: Location,
    pub comments: CommentSet,
}

// ============================================================================
// Container
// ============================================================================

/// Arena of every node built from one request, plus the by-name tables.
#[derive(Debug, Default)]
pub struct SchemaGraph {
    files: Vec<File>,
    enums: Vec<Enum>,
    enum_values: Vec<EnumValue>,
    messages: Vec<Message>,
    fields: Vec<Field>,
    oneofs: Vec<Oneof>,
    services: Vec<Service>,
    methods: Vec<Method>,

    files_by_path: AHashMap<String, FileId>,
    enums_by_name: AHashMap<String, EnumId>,
    messages_by_name: AHashMap<String, MessageId>,
}

macro_rules! arena_access {
    ($get:ident, $try_get:ident, $get_mut:ident, $push:ident, $field:ident, $id:ident, $node:ident) => {
        /// Panics if `id` came from a different graph.
        pub fn $get(&self, id: $id) -> &$node {
            &self.$field[id.index()]
        }

        pub fn $try_get(&self, id: $id) -> Option<&$node> {
            self.$field.get(id.index())
        }

        #[allow(dead_code)]
        pub(crate) fn $get_mut(&mut self, id: $id) -> &mut $node {
            &mut self.$field[id.index()]
        }

        pub(crate) fn $push(&mut self, node: $node) -> $id {
            let id = $id(self.$field.len() as u32);
            self.$field.push(node);
            id
        }
    };
}

impl SchemaGraph {
    arena_access!(file, try_file, file_mut, push_file, files, FileId, File);
    arena_access!(enum_, try_enum, enum_mut, push_enum, enums, EnumId, Enum);
    arena_access!(enum_value, try_enum_value, enum_value_mut, push_enum_value, enum_values, EnumValueId, EnumValue);
    arena_access!(message, try_message, message_mut, push_message, messages, MessageId, Message);
    arena_access!(field, try_field, field_mut, push_field, fields, FieldId, Field);
    arena_access!(oneof, try_oneof, oneof_mut, push_oneof, oneofs, OneofId, Oneof);
    arena_access!(service, try_service, service_mut, push_service, services, ServiceId, Service);
    arena_access!(method, try_method, method_mut, push_method, methods, MethodId, Method);

    /// Files in request order.
    pub fn files(&self) -> impl Iterator<Item = (FileId, &File)> {
        self.files
            .iter()
            .enumerate()
            .map(|(i, f)| (FileId(i as u32), f))
    }

    pub fn files_to_generate(&self) -> impl Iterator<Item = (FileId, &File)> {
        self.files().filter(|(_, f)| f.generate)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn file_by_path(&self, path: &str) -> Option<FileId> {
        self.files_by_path.get(path).copied()
    }

    /// Lookup by full name; a leading `.` is accepted.
    pub fn enum_by_name(&self, full_name: &str) -> Option<EnumId> {
        self.enums_by_name.get(trim_dot(full_name)).copied()
    }

    /// Lookup by full name; a leading `.` is accepted.
    pub fn message_by_name(&self, full_name: &str) -> Option<MessageId> {
        self.messages_by_name.get(trim_dot(full_name)).copied()
    }

    /// All messages, in build order (parents before their nested messages).
    pub fn messages(&self) -> impl Iterator<Item = (MessageId, &Message)> {
        self.messages
            .iter()
            .enumerate()
            .map(|(i, m)| (MessageId(i as u32), m))
    }

    pub fn enums(&self) -> impl Iterator<Item = (EnumId, &Enum)> {
        self.enums
            .iter()
            .enumerate()
            .map(|(i, e)| (EnumId(i as u32), e))
    }

    pub fn fields(&self) -> impl Iterator<Item = (FieldId, &Field)> {
        self.fields
            .iter()
            .enumerate()
            .map(|(i, f)| (FieldId(i as u32), f))
    }

    pub fn oneofs(&self) -> impl Iterator<Item = (OneofId, &Oneof)> {
        self.oneofs
            .iter()
            .enumerate()
            .map(|(i, o)| (OneofId(i as u32), o))
    }

    pub fn methods(&self) -> impl Iterator<Item = (MethodId, &Method)> {
        self.methods
            .iter()
            .enumerate()
            .map(|(i, m)| (MethodId(i as u32), m))
    }

    pub(crate) fn register_file(&mut self, path: &str, id: FileId) {
        self.files_by_path.insert(path.to_string(), id);
    }

    /// Returns the previous holder of `full_name`, if any.
    pub(crate) fn register_enum(&mut self, full_name: &str, id: EnumId) -> Option<EnumId> {
        self.enums_by_name.insert(full_name.to_string(), id)
    }

    /// Returns the previous holder of `full_name`, if any.
    pub(crate) fn register_message(&mut self, full_name: &str, id: MessageId) -> Option<MessageId> {
        self.messages_by_name.insert(full_name.to_string(), id)
    }

    /// File that first declared `full_name` as an enum or a message.
    pub(crate) fn declaring_file(&self, full_name: &str) -> Option<FileId> {
        if let Some(id) = self.enums_by_name.get(full_name) {
            return Some(self.enum_(*id).file);
        }
        self.messages_by_name
            .get(full_name)
            .map(|id| self.message(*id).file)
    }
}

fn trim_dot(name: &str) -> &str {
    name.strip_prefix('.').unwrap_or(name)
}
