//! Recursive compilation of schema types into Dart type descriptors.

use crate::{
    compiler::Compiler,
    error::{FidlgenError, Result},
    model,
    names::Context,
    utils::format_int,
};
use brine_fidl_schema::{CompoundIdentifier, DeclType, HandleSubtype, PrimitiveSubtype, Type, TypeKind};
use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref PRIMITIVE_DECLS: HashMap<PrimitiveSubtype, &'static str> = {
        use PrimitiveSubtype::*;
        let mut map = HashMap::new();
        map.insert(Bool, "bool");
        for int in [Int8, Int16, Int32, Int64, Uint8, Uint16, Uint32, Uint64] {
            map.insert(int, "int");
        }
        map.insert(Float32, "double");
        map.insert(Float64, "double");
        map
    };

    static ref TYPED_DATA_DECLS: HashMap<PrimitiveSubtype, &'static str> = {
        use PrimitiveSubtype::*;
        [
            (Int8, "Int8List"),
            (Int16, "Int16List"),
            (Int32, "Int32List"),
            (Int64, "Int64List"),
            (Uint8, "Uint8List"),
            (Uint16, "Uint16List"),
            (Uint32, "Uint32List"),
            (Uint64, "Uint64List"),
            (Float32, "Float32List"),
            (Float64, "Float64List"),
        ]
        .into_iter()
        .collect()
    };

    static ref WIRE_TYPE_NAMES: HashMap<PrimitiveSubtype, &'static str> = {
        use PrimitiveSubtype::*;
        [
            (Bool, "Bool"),
            (Int8, "Int8"),
            (Int16, "Int16"),
            (Int32, "Int32"),
            (Int64, "Int64"),
            (Uint8, "Uint8"),
            (Uint16, "Uint16"),
            (Uint32, "Uint32"),
            (Uint64, "Uint64"),
            (Float32, "Float32"),
            (Float64, "Float64"),
        ]
        .into_iter()
        .collect()
    };
}

pub fn primitive_decl(subtype: PrimitiveSubtype) -> &'static str {
    PRIMITIVE_DECLS[&subtype]
}

/// Name of the `$fidl.<Name>Type` wire codec for a primitive.
pub fn primitive_wire_name(subtype: PrimitiveSubtype) -> &'static str {
    WIRE_TYPE_NAMES[&subtype]
}

fn typed_data_decl(subtype: PrimitiveSubtype) -> Option<String> {
    TYPED_DATA_DECLS.get(&subtype).map(|decl| decl.to_string())
}

fn handle_kind(subtype: HandleSubtype) -> &'static str {
    match subtype {
        HandleSubtype::Channel => "Channel",
        HandleSubtype::Eventpair => "EventPair",
        HandleSubtype::Socket => "Socket",
        HandleSubtype::Vmo => "Vmo",
        _ => "Handle",
    }
}

impl<'a> Compiler<'a> {
    pub fn compile_type(&self, val: &Type) -> Result<model::Type> {
        let nullable = val.nullable;
        let mut decl_type = None;
        let mut typed_data = None;

        let (decl, sync_decl, async_decl, type_expr) = match &val.kind {
            TypeKind::Array { element_type, element_count } => {
                let t = self.compile_type(element_type)?;
                let (decl, sync_decl, async_decl) = list_forms(&t);
                let type_expr = format!(
                    "$fidl.ArrayType<{}>(element: {}, elementCount: {})",
                    decl, t.type_expr, element_count
                );
                (decl, sync_decl, async_decl, type_expr)
            }
            TypeKind::Vector { element_type, maybe_element_count } => {
                let t = self.compile_type(element_type)?;
                let (decl, sync_decl, async_decl) = list_forms(&t);
                let type_expr = format!(
                    "$fidl.VectorType<{}>(element: {}, maybeElementCount: {}, nullable: {})",
                    decl,
                    t.type_expr,
                    format_int(*maybe_element_count),
                    nullable
                );
                (decl, sync_decl, async_decl, type_expr)
            }
            TypeKind::String { maybe_element_count } => {
                let type_expr = format!(
                    "$fidl.StringType(maybeElementCount: {}, nullable: {})",
                    format_int(*maybe_element_count),
                    nullable
                );
                same_forms("String", type_expr)
            }
            TypeKind::Handle { subtype } => {
                let kind = handle_kind(*subtype);
                let type_expr = format!("$fidl.{}Type(nullable: {})", kind, nullable);
                same_forms(&format!("$zx.{}", kind), type_expr)
            }
            TypeKind::Request { subtype } => {
                let ci = CompoundIdentifier::parse(subtype)?;
                let t = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);
                let sync_t = self.peer_name(&ci, &t);
                (
                    format!("$fidl.InterfaceRequest<{}>", t),
                    format!("$fidl.InterfaceRequest<{}>", sync_t),
                    format!("$fidl.InterfaceRequest<{}>", t),
                    format!("$fidl.InterfaceRequestType<{}>(nullable: {})", t, nullable),
                )
            }
            TypeKind::Primitive { subtype } => {
                typed_data = typed_data_decl(*subtype);
                let type_expr = format!("$fidl.{}Type()", primitive_wire_name(*subtype));
                same_forms(primitive_decl(*subtype), type_expr)
            }
            TypeKind::Identifier { identifier } => {
                let ci = CompoundIdentifier::parse(identifier)?;
                let kind = self
                    .root
                    .decl_type(identifier)
                    .ok_or_else(|| FidlgenError::UnknownIdentifier(identifier.clone()))?;
                decl_type = Some(kind);

                let t = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);
                let sync_t = self.peer_name(&ci, &t);
                match kind {
                    DeclType::Interface => (
                        format!("$fidl.InterfaceHandle<{}>", t),
                        format!("$fidl.InterfaceHandle<{}>", sync_t),
                        format!("$fidl.InterfaceHandle<{}>", t),
                        format!("$fidl.InterfaceHandleType<{}>(nullable: {})", t, nullable),
                    ),
                    DeclType::XUnion if nullable => {
                        let type_expr = self.opt_type_symbol(&ci);
                        (t, sync_t.clone(), sync_t, type_expr)
                    }
                    _ if nullable => {
                        let type_expr =
                            format!("$fidl.PointerType<{}>(element: {})", t, self.type_symbol(&ci));
                        (t, sync_t.clone(), sync_t, type_expr)
                    }
                    _ => {
                        let type_expr = self.type_symbol(&ci);
                        (t, sync_t.clone(), sync_t, type_expr)
                    }
                }
            }
        };

        for (form, value) in [("primary", &decl), ("sync", &sync_decl), ("async", &async_decl)] {
            if value.is_empty() {
                return Err(FidlgenError::MissingPeerForm {
                    decl: format!("{:?}", val.kind),
                    form,
                });
            }
        }

        Ok(model::Type {
            decl,
            sync_decl,
            async_decl,
            nullable,
            decl_type,
            typed_data_decl: typed_data,
            type_expr,
        })
    }

    /// How the async bindings name the synchronous declaration `t`.
    fn peer_name(&self, ci: &CompoundIdentifier, t: &str) -> String {
        if self.in_external_library(ci) {
            format!("sync${}", t)
        } else {
            format!("$sync.{}", t)
        }
    }
}

fn same_forms(decl: &str, type_expr: String) -> (String, String, String, String) {
    (decl.to_string(), decl.to_string(), decl.to_string(), type_expr)
}

/// Packed typed-data list when the element has one, `List<E>` otherwise.
fn list_forms(element: &model::Type) -> (String, String, String) {
    match &element.typed_data_decl {
        Some(packed) => (packed.clone(), packed.clone(), packed.clone()),
        None => (
            format!("List<{}>", element.decl),
            format!("List<{}>", element.sync_decl),
            format!("List<{}>", element.async_decl),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brine_fidl_schema::Root;

    fn root() -> Root {
        Root::from_json(
            r#"{
                "name": "fidl.test",
                "library_dependencies": [
                    {"name": "fidl.other", "declarations": {"fidl.other/Far": "struct"}}
                ],
                "declarations": {
                    "fidl.test/Point": "struct",
                    "fidl.test/Choice": "xunion",
                    "fidl.test/Service": "interface"
                }
            }"#,
        )
        .unwrap()
    }

    fn ty(json: &str) -> Type {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn primitive_forms_are_identical() {
        let root = root();
        let c = Compiler::new(&root);
        let t = c.compile_type(&Type::primitive(PrimitiveSubtype::Int32)).unwrap();
        assert_eq!(t.decl, "int");
        assert_eq!(t.sync_decl, "int");
        assert_eq!(t.async_decl, "int");
        assert_eq!(t.typed_data_decl.as_deref(), Some("Int32List"));
        assert_eq!(t.type_expr, "$fidl.Int32Type()");

        let b = c.compile_type(&Type::primitive(PrimitiveSubtype::Bool)).unwrap();
        assert_eq!(b.typed_data_decl, None);
    }

    #[test]
    fn vectors_of_numbers_flatten_to_typed_data() {
        let root = root();
        let c = Compiler::new(&root);
        let t = c
            .compile_type(&ty(
                r#"{"kind": "vector", "element_type": {"kind": "primitive", "subtype": "uint8"}, "maybe_element_count": 16}"#,
            ))
            .unwrap();
        assert_eq!(t.decl, "Uint8List");
        assert_eq!(t.sync_decl, "Uint8List");
        assert_eq!(
            t.type_expr,
            "$fidl.VectorType<Uint8List>(element: $fidl.Uint8Type(), maybeElementCount: 16, nullable: false)"
        );
    }

    #[test]
    fn arrays_of_structs_wrap_each_form() {
        let root = root();
        let c = Compiler::new(&root);
        let t = c
            .compile_type(&ty(
                r#"{"kind": "array", "element_type": {"kind": "identifier", "identifier": "fidl.test/Point"}, "element_count": 3}"#,
            ))
            .unwrap();
        assert_eq!(t.decl, "List<Point>");
        assert_eq!(t.sync_decl, "List<$sync.Point>");
        assert_eq!(t.type_expr, "$fidl.ArrayType<List<Point>>(element: kPoint_Type, elementCount: 3)");
    }

    #[test]
    fn nullability_of_identifiers() {
        let root = root();
        let c = Compiler::new(&root);
        let plain = c.compile_type(&Type::identifier("fidl.test/Point", false)).unwrap();
        assert_eq!(plain.type_expr, "kPoint_Type");
        let boxed = c.compile_type(&Type::identifier("fidl.test/Point", true)).unwrap();
        assert_eq!(boxed.type_expr, "$fidl.PointerType<Point>(element: kPoint_Type)");
        assert_eq!(boxed.decl, "Point");

        let choice = c.compile_type(&Type::identifier("fidl.test/Choice", true)).unwrap();
        assert_eq!(choice.type_expr, "kChoice_OptType");
        let choice = c.compile_type(&Type::identifier("fidl.test/Choice", false)).unwrap();
        assert_eq!(choice.type_expr, "kChoice_Type");
    }

    #[test]
    fn external_identifiers_use_module_aliases() {
        let root = root();
        let c = Compiler::new(&root);
        let t = c.compile_type(&Type::identifier("fidl.other/Far", false)).unwrap();
        assert_eq!(t.decl, "lib$fidl_other.Far");
        assert_eq!(t.sync_decl, "sync$lib$fidl_other.Far");
        assert_eq!(t.type_expr, "lib$fidl_other.kFar_Type");
    }

    #[test]
    fn interface_handles_and_requests() {
        let root = root();
        let c = Compiler::new(&root);
        let handle = c.compile_type(&Type::identifier("fidl.test/Service", true)).unwrap();
        assert_eq!(handle.decl, "$fidl.InterfaceHandle<Service>");
        assert_eq!(handle.sync_decl, "$fidl.InterfaceHandle<$sync.Service>");
        assert_eq!(handle.async_decl, handle.decl);
        assert_eq!(handle.type_expr, "$fidl.InterfaceHandleType<Service>(nullable: true)");

        let request = c
            .compile_type(&ty(r#"{"kind": "request", "subtype": "fidl.test/Service"}"#))
            .unwrap();
        assert_eq!(request.decl, "$fidl.InterfaceRequest<Service>");
        assert_eq!(request.type_expr, "$fidl.InterfaceRequestType<Service>(nullable: false)");
    }

    #[test]
    fn handles_map_to_resource_kinds() {
        let root = root();
        let c = Compiler::new(&root);
        let chan = c.compile_type(&ty(r#"{"kind": "handle", "subtype": "channel", "nullable": true}"#)).unwrap();
        assert_eq!(chan.decl, "$zx.Channel");
        assert_eq!(chan.type_expr, "$fidl.ChannelType(nullable: true)");
        let job = c.compile_type(&ty(r#"{"kind": "handle", "subtype": "job"}"#)).unwrap();
        assert_eq!(job.decl, "$zx.Handle");
    }

    #[test]
    fn unknown_identifier_is_an_error() {
        let root = root();
        let c = Compiler::new(&root);
        let err = c.compile_type(&Type::identifier("fidl.test/Missing", false)).unwrap_err();
        assert!(matches!(err, FidlgenError::UnknownIdentifier(ref name) if name == "fidl.test/Missing"));
    }
}
