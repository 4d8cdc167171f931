use crate::error::SchemaError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeclType {
    Const,
    Enum,
    Bits,
    Interface,
    Struct,
    Table,
    Union,
    XUnion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveSubtype {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HandleSubtype {
    Handle,
    Process,
    Thread,
    Vmo,
    Channel,
    Event,
    Port,
    Interrupt,
    Debuglog,
    Socket,
    Resource,
    Eventpair,
    Job,
    Vmar,
    Fifo,
    Guest,
    Timer,
    Bti,
    Profile,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TypeKind {
    Array {
        element_type:  Box<Type>,
        element_count: u32,
    },
    Vector {
        element_type:        Box<Type>,
        #[serde(default)]
        maybe_element_count: Option<u32>,
    },
    String {
        #[serde(default)]
        maybe_element_count: Option<u32>,
    },
    Handle {
        subtype: HandleSubtype,
    },
    Request {
        subtype: String,
    },
    Primitive {
        subtype: PrimitiveSubtype,
    },
    Identifier {
        identifier: String,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Type {
    #[serde(flatten)]
    pub kind:     TypeKind,
    #[serde(default)]
    pub nullable: bool,
}

impl Type {
    pub fn primitive(subtype: PrimitiveSubtype) -> Self {
        Type {
            kind:     TypeKind::Primitive { subtype },
            nullable: false,
        }
    }

    pub fn identifier(identifier: &str, nullable: bool) -> Self {
        Type {
            kind: TypeKind::Identifier {
                identifier: identifier.to_string(),
            },
            nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Literal {
    String { value: String },
    Numeric { value: String },
    True,
    False,
    Default,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Constant {
    Identifier { identifier: String },
    Literal { literal: Literal },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Attribute {
    pub name:  String,
    #[serde(default)]
    pub value: String,
}

/// Declarations and members that can carry `[Attribute]` annotations.
pub trait Attributed {
    fn attributes(&self) -> &[Attribute];

    fn lookup_attribute(&self, name: &str) -> Option<&Attribute> {
        self.attributes().iter().find(|attr| attr.name == name)
    }

    fn has_attribute(&self, name: &str) -> bool {
        self.lookup_attribute(name).is_some()
    }
}

macro_rules! impl_attributed {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Attributed for $ty {
                fn attributes(&self) -> &[Attribute] {
                    &self.maybe_attributes
                }
            }
        )*
    };
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Const {
    pub name:             String,
    #[serde(rename = "type")]
    pub type_:            Type,
    pub value:            Constant,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EnumMember {
    pub name:             String,
    pub value:            Constant,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Enum {
    pub name:             String,
    #[serde(rename = "type")]
    pub type_:            PrimitiveSubtype,
    pub members:          Vec<EnumMember>,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct BitsMember {
    pub name:             String,
    pub value:            Constant,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Bits {
    pub name:             String,
    #[serde(rename = "type")]
    pub type_:            Type,
    #[serde(default)]
    pub mask:             Option<String>,
    pub members:          Vec<BitsMember>,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct StructMember {
    pub name:                String,
    #[serde(rename = "type")]
    pub type_:               Type,
    pub offset:              u32,
    #[serde(default)]
    pub maybe_default_value: Option<Constant>,
    #[serde(default)]
    pub maybe_attributes:    Vec<Attribute>,
}

impl StructMember {
    /// The single `uint8` placeholder that stands in for the members of an
    /// empty struct, which still occupies one byte on the wire.
    pub fn empty(name: &str) -> Self {
        StructMember {
            name:                name.to_string(),
            type_:               Type::primitive(PrimitiveSubtype::Uint8),
            offset:              0,
            maybe_default_value: None,
            maybe_attributes:    Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Struct {
    pub name:             String,
    pub members:          Vec<StructMember>,
    pub size:             u32,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TableMember {
    pub ordinal:             u32,
    #[serde(default)]
    pub reserved:            bool,
    #[serde(default, rename = "type")]
    pub type_:               Option<Type>,
    #[serde(default)]
    pub name:                Option<String>,
    #[serde(default)]
    pub maybe_default_value: Option<Constant>,
    #[serde(default)]
    pub maybe_attributes:    Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Table {
    pub name:             String,
    pub members:          Vec<TableMember>,
    pub size:             u32,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UnionMember {
    pub name:             String,
    #[serde(rename = "type")]
    pub type_:            Type,
    pub offset:           u32,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Union {
    pub name:             String,
    pub members:          Vec<UnionMember>,
    pub size:             u32,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct XUnionMember {
    pub ordinal:          u32,
    pub name:             String,
    #[serde(rename = "type")]
    pub type_:            Type,
    pub offset:           u32,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct XUnion {
    pub name:             String,
    pub members:          Vec<XUnionMember>,
    pub size:             u32,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Parameter {
    pub name:   String,
    #[serde(rename = "type")]
    pub type_:  Type,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Method {
    pub ordinal:             u64,
    #[serde(default)]
    pub generated_ordinal:   Option<u64>,
    pub name:                String,
    pub has_request:         bool,
    #[serde(default)]
    pub maybe_request:       Vec<Parameter>,
    #[serde(default)]
    pub maybe_request_size:  u32,
    pub has_response:        bool,
    #[serde(default)]
    pub maybe_response:      Vec<Parameter>,
    #[serde(default)]
    pub maybe_response_size: u32,
    #[serde(default)]
    pub maybe_attributes:    Vec<Attribute>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Interface {
    pub name:             String,
    pub methods:          Vec<Method>,
    #[serde(default)]
    pub maybe_attributes: Vec<Attribute>,
}

impl_attributed!(
    Const, EnumMember, Enum, BitsMember, Bits, StructMember, Struct, TableMember, Table,
    UnionMember, Union, XUnionMember, XUnion, Method, Interface,
);

/// A library this one depends on, with the kinds of the declarations it exports.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Library {
    pub name:         String,
    #[serde(default)]
    pub declarations: BTreeMap<String, DeclType>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Root {
    #[serde(default)]
    pub version:                Option<String>,
    pub name:                   String,
    #[serde(default)]
    pub library_dependencies:   Vec<Library>,
    #[serde(default)]
    pub const_declarations:     Vec<Const>,
    #[serde(default)]
    pub enum_declarations:      Vec<Enum>,
    #[serde(default)]
    pub bits_declarations:      Vec<Bits>,
    #[serde(default)]
    pub interface_declarations: Vec<Interface>,
    #[serde(default)]
    pub struct_declarations:    Vec<Struct>,
    #[serde(default)]
    pub table_declarations:     Vec<Table>,
    #[serde(default)]
    pub union_declarations:     Vec<Union>,
    #[serde(default)]
    pub xunion_declarations:    Vec<XUnion>,
    #[serde(default)]
    pub declaration_order:      Vec<String>,
    #[serde(default)]
    pub declarations:           BTreeMap<String, DeclType>,
}

impl Root {
    pub fn from_json(text: &str) -> Result<Self, SchemaError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SchemaError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Kind of a declaration in this library or in any of its dependencies.
    pub fn decl_type(&self, name: &str) -> Option<DeclType> {
        self.declarations.get(name).copied().or_else(|| {
            self.library_dependencies
                .iter()
                .find_map(|lib| lib.declarations.get(name).copied())
        })
    }

    pub fn find_struct(&self, name: &str) -> Option<&Struct> {
        self.struct_declarations.iter().find(|decl| decl.name == name)
    }

    pub fn find_union(&self, name: &str) -> Option<&Union> {
        self.union_declarations.iter().find(|decl| decl.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_tagged_type_kinds() {
        let ty: Type = serde_json::from_str(
            r#"{"kind": "vector", "element_type": {"kind": "primitive", "subtype": "uint8"}, "nullable": true}"#,
        )
        .unwrap();
        assert!(ty.nullable);
        match ty.kind {
            TypeKind::Vector { element_type, maybe_element_count } => {
                assert_eq!(*element_type, Type::primitive(PrimitiveSubtype::Uint8));
                assert_eq!(maybe_element_count, None);
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn rejects_unknown_type_kind() {
        let result: Result<Type, _> = serde_json::from_str(r#"{"kind": "pointer"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn decodes_constants() {
        let c: Constant = serde_json::from_str(
            r#"{"kind": "literal", "literal": {"kind": "numeric", "value": "42"}}"#,
        )
        .unwrap();
        assert_eq!(
            c,
            Constant::Literal {
                literal: Literal::Numeric { value: "42".to_string() }
            }
        );

        let t: Literal = serde_json::from_str(r#"{"kind": "true", "value": "true"}"#).unwrap();
        assert_eq!(t, Literal::True);
    }

    #[test]
    fn decl_type_searches_dependencies() {
        let root = Root::from_json(
            r#"{
                "name": "fidl.a",
                "library_dependencies": [
                    {"name": "fidl.b", "declarations": {"fidl.b/Other": "xunion"}}
                ],
                "declarations": {"fidl.a/Mine": "table"}
            }"#,
        )
        .unwrap();
        assert_eq!(root.decl_type("fidl.a/Mine"), Some(DeclType::Table));
        assert_eq!(root.decl_type("fidl.b/Other"), Some(DeclType::XUnion));
        assert_eq!(root.decl_type("fidl.c/Missing"), None);
    }

    #[test]
    fn attribute_lookup() {
        let union: Union = serde_json::from_str(
            r#"{"name": "a/R", "size": 8, "members": [],
                "maybe_attributes": [{"name": "Result", "value": ""}]}"#,
        )
        .unwrap();
        assert!(union.has_attribute("Result"));
        assert!(!union.has_attribute("Doc"));
    }
}
