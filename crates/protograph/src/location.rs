//! Source locations: structural paths into a `.proto` file.
//!
//! A path is a sequence of `(tag, index)` pairs where `tag` is the field number
//! of the repeated field in `descriptor.proto` that holds the declaration and
//! `index` is its position in that list. For example `[4, 0, 2, 1]` is
//! "file.message_type[0].field[1]". This is exactly the key `protoc` uses in
//! `SourceCodeInfo`, which is how comments are found again.

use std::fmt;
use std::ops::Deref;

/// Structural field numbers from `descriptor.proto`.
///
/// Numbers repeat across containers (`FileMessage` and `MessageEnum` are
/// both 4); use [`PathTag::number`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PathTag {
    /// `FileDescriptorProto.message_type`
    FileMessage,
    /// `FileDescriptorProto.enum_type`
    FileEnum,
    /// `FileDescriptorProto.service`
    FileService,
    /// `FileDescriptorProto.extension`
    FileExtension,
    /// `DescriptorProto.field`
    MessageField,
    /// `DescriptorProto.nested_type`
    MessageNested,
    /// `DescriptorProto.enum_type`
    MessageEnum,
    /// `DescriptorProto.extension`
    MessageExtension,
    /// `DescriptorProto.oneof_decl`
    MessageOneof,
    /// `EnumDescriptorProto.value`
    EnumValue,
    /// `ServiceDescriptorProto.method`
    ServiceMethod,
}

impl PathTag {
    pub const ALL: [PathTag; 11] = [
        PathTag::FileMessage,
        PathTag::FileEnum,
        PathTag::FileService,
        PathTag::FileExtension,
        PathTag::MessageField,
        PathTag::MessageNested,
        PathTag::MessageEnum,
        PathTag::MessageExtension,
        PathTag::MessageOneof,
        PathTag::EnumValue,
        PathTag::ServiceMethod,
    ];

    pub const fn number(self) -> i32 {
        match self {
            PathTag::FileMessage => 4,
            PathTag::FileEnum => 5,
            PathTag::FileService => 6,
            PathTag::FileExtension => 7,
            PathTag::MessageField => 2,
            PathTag::MessageNested => 3,
            PathTag::MessageEnum => 4,
            PathTag::MessageExtension => 6,
            PathTag::MessageOneof => 8,
            PathTag::EnumValue => 2,
            PathTag::ServiceMethod => 2,
        }
    }
}

/// A structural path (`SourceCodeInfo.Location.path`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SourcePath(Vec<i32>);

impl SourcePath {
    pub fn new(raw: Vec<i32>) -> Self {
        Self(raw)
    }

    /// Extend into a fresh path; siblings share `self` as a prefix, so it is
    /// never mutated in place.
    pub fn child(&self, tag: PathTag, index: usize) -> SourcePath {
        let mut raw = Vec::with_capacity(self.0.len() + 2);
        raw.extend_from_slice(&self.0);
        raw.push(tag.number());
        raw.push(index as i32);
        SourcePath(raw)
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.0
    }
}

impl Deref for SourcePath {
    type Target = [i32];

    fn deref(&self) -> &[i32] {
        &self.0
    }
}

impl fmt::Display for SourcePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, n) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{n}")?;
        }
        write!(f, "]")
    }
}

/// Where a declaration lives: the file it came from plus its structural path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Location {
    pub source_file: String,
    pub path: SourcePath,
}

impl Location {
    /// The root location of a file (empty path).
    pub fn file(source_file: impl Into<String>) -> Self {
        Self {
            source_file: source_file.into(),
            path: SourcePath::default(),
        }
    }

    pub fn child(&self, tag: PathTag, index: usize) -> Location {
        Location {
            source_file: self.source_file.clone(),
            path: self.path.child(tag, index),
        }
    }
}
