//! The compiled generation model: every name, type and wire expression the
//! Dart emitter needs, already resolved and legalized.

use brine_fidl_schema::DeclType;
use serde::Serialize;

/// A compiled type reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Type {
    /// Type in the synchronous bindings.
    pub decl:            String,
    /// Type in the async bindings when referring to the synchronous bindings.
    pub sync_decl:       String,
    /// Type in the async bindings when referring to the async bindings.
    pub async_decl:      String,
    pub nullable:        bool,
    pub decl_type:       Option<DeclType>,
    /// Packed `dart:typed_data` list used for vectors and arrays of this type.
    pub typed_data_decl: Option<String>,
    /// Dart expression for the `$fidl.FidlType` that encodes this type.
    pub type_expr:       String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Const {
    #[serde(rename = "type")]
    pub type_: Type,
    pub name:  String,
    pub value: String,
    pub doc:   Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumMember {
    pub name:  String,
    pub value: String,
    pub doc:   Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name:        String,
    pub members:     Vec<EnumMember>,
    pub type_symbol: String,
    pub type_expr:   String,
    pub doc:         Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BitsMember {
    pub name:  String,
    pub value: String,
    pub doc:   Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bits {
    pub name:        String,
    pub members:     Vec<BitsMember>,
    pub type_symbol: String,
    pub type_expr:   String,
    pub doc:         Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnionMember {
    #[serde(rename = "type")]
    pub type_:     Type,
    pub name:      String,
    pub ctor_name: String,
    pub tag:       String,
    pub offset:    u32,
    pub type_expr: String,
    pub doc:       Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Union {
    pub name:        String,
    pub tag_name:    String,
    pub members:     Vec<UnionMember>,
    pub type_symbol: String,
    pub type_expr:   String,
    pub doc:         Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XUnionMember {
    pub ordinal:   u32,
    #[serde(rename = "type")]
    pub type_:     Type,
    pub name:      String,
    pub ctor_name: String,
    pub tag:       String,
    pub offset:    u32,
    pub doc:       Vec<String>,
}

/// An extensible union, dispatched on member ordinals rather than position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XUnion {
    pub name:            String,
    pub tag_name:        String,
    pub members:         Vec<XUnionMember>,
    pub type_symbol:     String,
    pub type_expr:       String,
    pub opt_type_symbol: String,
    pub opt_type_expr:   String,
    pub doc:             Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructMember {
    #[serde(rename = "type")]
    pub type_:         Type,
    pub name:          String,
    pub default_value: Option<String>,
    pub offset:        u32,
    pub type_expr:     String,
    pub doc:           Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Struct {
    pub name:               String,
    pub members:            Vec<StructMember>,
    pub type_symbol:        String,
    pub type_expr:          String,
    pub has_nullable_field: bool,
    pub doc:                Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TableMember {
    pub ordinal:       u32,
    #[serde(rename = "type")]
    pub type_:         Type,
    pub name:          String,
    pub default_value: Option<String>,
    pub doc:           Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name:        String,
    pub members:     Vec<TableMember>,
    pub type_symbol: String,
    pub type_expr:   String,
    pub doc:         Vec<String>,
}

/// A method request or response parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    #[serde(rename = "type")]
    pub type_:     Type,
    pub name:      String,
    pub offset:    u32,
    pub type_expr: String,
}

/// The union, success payload and error payload behind a method that
/// follows the result convention.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultShape {
    pub result_type:  Union,
    pub value_type:   Type,
    pub error_type:   Type,
    /// Field names of the success struct, paired with `method_parameters`.
    pub value_fields: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodResponse {
    /// Parameters as they are encoded in the response message.
    pub wire_parameters:   Vec<Parameter>,
    /// Parameters as they appear in the Dart method signature. Identical to
    /// `wire_parameters` unless `result` is set.
    pub method_parameters: Vec<Parameter>,
    pub result:            Option<ResultShape>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Method {
    pub ordinal:              u64,
    pub ordinal_name:         String,
    pub name:                 String,
    pub has_request:          bool,
    pub request:              Vec<Parameter>,
    pub request_size:         u32,
    pub has_response:         bool,
    pub response:             MethodResponse,
    pub response_size:        u32,
    pub async_response_class: Option<String>,
    pub async_response_type:  Option<String>,
    pub callback_type:        String,
    pub type_symbol:          String,
    pub type_expr:            String,
    pub transitional:         bool,
    pub doc:                  Vec<String>,
}

impl Method {
    /// Server-initiated messages have a response and no request.
    pub fn is_event(&self) -> bool {
        !self.has_request && self.has_response
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Interface {
    pub name:         String,
    /// Quoted discoverable service name, or `null`.
    pub service_name: String,
    pub service_data: String,
    pub proxy_name:   String,
    pub binding_name: String,
    pub events_name:  String,
    pub methods:      Vec<Method>,
    pub has_events:   bool,
    pub doc:          Vec<String>,
}

/// Another FIDL library imported by the generated code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Import {
    pub url:        String,
    pub local_name: String,
    pub async_url:  String,
}

/// Everything generated for one FIDL library.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Root {
    pub library_name: String,
    pub imports:      Vec<Import>,
    pub consts:       Vec<Const>,
    pub enums:        Vec<Enum>,
    pub bits:         Vec<Bits>,
    pub interfaces:   Vec<Interface>,
    pub structs:      Vec<Struct>,
    pub tables:       Vec<Table>,
    pub unions:       Vec<Union>,
    pub xunions:      Vec<XUnion>,
}
