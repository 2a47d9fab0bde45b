//! Flat protobuf descriptors, as handed to a code generator plugin.
//!
//! These are the already-decoded `google.protobuf.FileDescriptorProto` family
//! (and the `google.protobuf.compiler.CodeGeneratorRequest` envelope) in their
//! **JSON mapping**, i.e. what `buf build --as-file-descriptor-set` or
//! `protoc --descriptor_set_out` + a JSON transcoder produce:
//!
//! ```json
//! { "name": "a.proto", "package": "a", "messageType": [{ "name": "Bar" }] }
//! ```
//!
//! Nothing here validates or links anything: every reference between
//! declarations is still a (possibly dot-prefixed) full name string. Linking is
//! the job of the `protograph` crate.

use serde::{Deserialize, Serialize};

// =============================================================================
// Plugin envelope
// =============================================================================

/// `google.protobuf.compiler.CodeGeneratorRequest`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGeneratorRequest {
    /// Files the plugin is asked to emit output for (paths into `proto_file`).
    #[serde(default)]
    pub file_to_generate: Vec<String>,
    pub parameter: Option<String>,
    /// Every file in the import closure, dependencies before dependents.
    #[serde(default)]
    pub proto_file: Vec<FileDescriptorProto>,
    pub compiler_version: Option<CompilerVersion>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompilerVersion {
    #[serde(default)]
    pub major: i32,
    #[serde(default)]
    pub minor: i32,
    #[serde(default)]
    pub patch: i32,
    pub suffix: Option<String>,
}

/// `google.protobuf.compiler.CodeGeneratorResponse`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeGeneratorResponse {
    /// Set when generation failed; `file` is then empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supported_features: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum_edition: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum_edition: Option<i32>,
    #[serde(default)]
    pub file: Vec<GeneratedFileContent>,
}

/// `CodeGeneratorResponse.File`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedFileContent {
    pub name: String,
    pub content: String,
}

/// `google.protobuf.FileDescriptorSet`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptorSet {
    #[serde(default)]
    pub file: Vec<FileDescriptorProto>,
}

// =============================================================================
// Declarations
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileDescriptorProto {
    pub name: Option<String>,
    pub package: Option<String>,
    #[serde(default)]
    pub dependency: Vec<String>,
    #[serde(default)]
    pub message_type: Vec<DescriptorProto>,
    #[serde(default)]
    pub enum_type: Vec<EnumDescriptorProto>,
    #[serde(default)]
    pub service: Vec<ServiceDescriptorProto>,
    #[serde(default)]
    pub extension: Vec<FieldDescriptorProto>,
    pub source_code_info: Option<SourceCodeInfo>,
    /// `"proto2"`, `"proto3"` or `"editions"`; absent means proto2.
    pub syntax: Option<String>,
    pub edition: Option<Edition>,
}

impl FileDescriptorProto {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or("")
    }

    pub fn package(&self) -> &str {
        self.package.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorProto {
    pub name: Option<String>,
    #[serde(default)]
    pub field: Vec<FieldDescriptorProto>,
    #[serde(default)]
    pub extension: Vec<FieldDescriptorProto>,
    #[serde(default)]
    pub nested_type: Vec<DescriptorProto>,
    #[serde(default)]
    pub enum_type: Vec<EnumDescriptorProto>,
    #[serde(default)]
    pub oneof_decl: Vec<OneofDescriptorProto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptorProto {
    pub name: Option<String>,
    pub number: Option<i32>,
    pub label: Option<FieldLabel>,
    #[serde(rename = "type")]
    pub r#type: Option<FieldType>,
    /// Full name of the enum/message type for enum, message and group fields.
    pub type_name: Option<String>,
    /// Full name of the extended message; set only on extensions.
    pub extendee: Option<String>,
    pub default_value: Option<String>,
    /// Index into the containing message's `oneof_decl`.
    pub oneof_index: Option<i32>,
    pub json_name: Option<String>,
    pub proto3_optional: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OneofDescriptorProto {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumDescriptorProto {
    pub name: Option<String>,
    #[serde(default)]
    pub value: Vec<EnumValueDescriptorProto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumValueDescriptorProto {
    pub name: Option<String>,
    pub number: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceDescriptorProto {
    pub name: Option<String>,
    #[serde(default)]
    pub method: Vec<MethodDescriptorProto>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MethodDescriptorProto {
    pub name: Option<String>,
    pub input_type: Option<String>,
    pub output_type: Option<String>,
    pub client_streaming: Option<bool>,
    pub server_streaming: Option<bool>,
}

// =============================================================================
// Source info
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceCodeInfo {
    #[serde(default)]
    pub location: Vec<Location>,
}

/// One entry of `SourceCodeInfo`: a structural path plus its comments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    #[serde(default)]
    pub path: Vec<i32>,
    #[serde(default)]
    pub span: Vec<i32>,
    pub leading_comments: Option<String>,
    pub trailing_comments: Option<String>,
    #[serde(default)]
    pub leading_detached_comments: Vec<String>,
}

// =============================================================================
// Enumerations
// =============================================================================

/// `FieldDescriptorProto.Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "TYPE_DOUBLE")]
    Double,
    #[serde(rename = "TYPE_FLOAT")]
    Float,
    #[serde(rename = "TYPE_INT64")]
    Int64,
    #[serde(rename = "TYPE_UINT64")]
    Uint64,
    #[serde(rename = "TYPE_INT32")]
    Int32,
    #[serde(rename = "TYPE_FIXED64")]
    Fixed64,
    #[serde(rename = "TYPE_FIXED32")]
    Fixed32,
    #[serde(rename = "TYPE_BOOL")]
    Bool,
    #[serde(rename = "TYPE_STRING")]
    String,
    #[serde(rename = "TYPE_GROUP")]
    Group,
    #[serde(rename = "TYPE_MESSAGE")]
    Message,
    #[serde(rename = "TYPE_BYTES")]
    Bytes,
    #[serde(rename = "TYPE_UINT32")]
    Uint32,
    #[serde(rename = "TYPE_ENUM")]
    Enum,
    #[serde(rename = "TYPE_SFIXED32")]
    Sfixed32,
    #[serde(rename = "TYPE_SFIXED64")]
    Sfixed64,
    #[serde(rename = "TYPE_SINT32")]
    Sint32,
    #[serde(rename = "TYPE_SINT64")]
    Sint64,
}

/// `FieldDescriptorProto.Label`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldLabel {
    #[default]
    #[serde(rename = "LABEL_OPTIONAL")]
    Optional,
    #[serde(rename = "LABEL_REQUIRED")]
    Required,
    #[serde(rename = "LABEL_REPEATED")]
    Repeated,
}

/// `google.protobuf.Edition`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Edition {
    #[serde(rename = "EDITION_UNKNOWN")]
    Unknown,
    #[serde(rename = "EDITION_PROTO2")]
    Proto2,
    #[serde(rename = "EDITION_PROTO3")]
    Proto3,
    #[serde(rename = "EDITION_2023")]
    Edition2023,
    #[serde(rename = "EDITION_2024")]
    Edition2024,
}

impl Edition {
    /// Wire number of the edition (`descriptor.proto` numbering).
    pub const fn number(self) -> i32 {
        match self {
            Edition::Unknown => 0,
            Edition::Proto2 => 998,
            Edition::Proto3 => 999,
            Edition::Edition2023 => 1000,
            Edition::Edition2024 => 1001,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_buf_style_json() {
        let text = r#"{
            "fileToGenerate": ["b.proto"],
            "compilerVersion": { "major": 3, "minor": 21, "patch": 12 },
            "protoFile": [{
                "name": "b.proto",
                "package": "b",
                "dependency": ["a.proto"],
                "messageType": [{
                    "name": "Foo",
                    "field": [{
                        "name": "bar",
                        "number": 1,
                        "label": "LABEL_OPTIONAL",
                        "type": "TYPE_MESSAGE",
                        "typeName": ".a.Bar",
                        "jsonName": "bar",
                        "oneofIndex": 0
                    }],
                    "oneofDecl": [{ "name": "choice" }]
                }],
                "sourceCodeInfo": {
                    "location": [{
                        "path": [4, 0],
                        "span": [3, 0, 5, 1],
                        "leadingComments": " Foo docs\n",
                        "leadingDetachedComments": [" detached\n"]
                    }]
                },
                "syntax": "proto3"
            }]
        }"#;

        let req: CodeGeneratorRequest = serde_json::from_str(text).expect("parse request");
        assert_eq!(req.file_to_generate, vec!["b.proto".to_string()]);
        let file = &req.proto_file[0];
        assert_eq!(file.name(), "b.proto");
        assert_eq!(file.package(), "b");

        let field = &file.message_type[0].field[0];
        assert_eq!(field.r#type, Some(FieldType::Message));
        assert_eq!(field.label, Some(FieldLabel::Optional));
        assert_eq!(field.type_name.as_deref(), Some(".a.Bar"));
        assert_eq!(field.oneof_index, Some(0));

        let loc = &file.source_code_info.as_ref().expect("source info").location[0];
        assert_eq!(loc.path, vec![4, 0]);
        assert_eq!(loc.leading_detached_comments.len(), 1);
        assert!(loc.trailing_comments.is_none());
    }

    #[test]
    fn edition_numbers_match_descriptor_proto() {
        let e: Edition = serde_json::from_str("\"EDITION_2023\"").expect("edition");
        assert_eq!(e.number(), 1000);
        assert!(Edition::Proto3 < Edition::Edition2023);
    }
}
