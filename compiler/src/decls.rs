//! Per-kind declaration compilers.

use crate::{
    compiler::Compiler,
    error::{FidlgenError, Result},
    literal::{format_literal, quote_dart_string},
    model,
    names::{legalize_lower, legalize_upper, Context},
    type_compiler::primitive_wire_name,
    utils::{doc_string, format_bool},
};
use brine_fidl_schema::{
    self as schema, Attributed, CompoundIdentifier, Constant, DeclType, TypeKind,
};

/// Name of the member synthesized for structs declared without members.
pub const EMPTY_STRUCT_MEMBER: &str = "reserved";

fn member_type_expr(t: &model::Type, offset: u32) -> String {
    format!("$fidl.MemberType<{}>(type: {}, offset: {})", t.decl, t.type_expr, offset)
}

fn format_parameter_list(params: &[model::Parameter]) -> String {
    if params.is_empty() {
        return "null".to_string();
    }
    let lines: Vec<String> = params
        .iter()
        .map(|p| format!("      {},\n", p.type_expr))
        .collect();
    format!("<$fidl.MemberType>[\n{}    ]", lines.concat())
}

fn format_member_list(type_exprs: &[&str]) -> String {
    if type_exprs.is_empty() {
        return "<$fidl.MemberType>[]".to_string();
    }
    let lines: Vec<String> = type_exprs.iter().map(|e| format!("    {},\n", e)).collect();
    format!("<$fidl.MemberType>[\n{}  ]", lines.concat())
}

fn format_ordinal_map(entries: &[(u32, &str)]) -> String {
    if entries.is_empty() {
        return "<int, $fidl.FidlType>{}".to_string();
    }
    let lines: Vec<String> = entries
        .iter()
        .map(|(ordinal, expr)| format!("    {}: {},\n", ordinal, expr))
        .collect();
    format!("<int, $fidl.FidlType>{{\n{}  }}", lines.concat())
}

/// `$fidl.<kind><Name>(encodedSize: .., members: .., ctor: ..)` with an
/// optional trailing `nullable: true`.
fn composite_type_expr(kind: &str, name: &str, size: u32, members: &str, nullable: bool) -> String {
    let mut out = format!(
        "$fidl.{}<{}>(\n  encodedSize: {},\n  members: {},\n  ctor: {}._ctor,\n",
        kind, name, size, members, name
    );
    if nullable {
        out.push_str(&format!("  nullable: {},\n", format_bool(nullable)));
    }
    out.push(')');
    out
}

fn method_type_expr(request: &[model::Parameter], response: &[model::Parameter], name: &str) -> String {
    format!(
        "$fidl.MethodType(\n    request: {},\n    response: {},\n    name: r\"{}\",\n  )",
        format_parameter_list(request),
        format_parameter_list(response),
        name
    )
}

impl<'a> Compiler<'a> {
    pub fn compile_constant(&self, val: &Constant, t: Option<&model::Type>) -> Result<String> {
        let identifier = match val {
            Constant::Literal { literal } => return format_literal(literal),
            Constant::Identifier { identifier } => identifier,
        };
        let ci = CompoundIdentifier::parse(identifier)?;
        if let Some(member) = &ci.member {
            return self.compile_member_reference(identifier, &ci, member);
        }

        if let Some(t) = t.filter(|t| t.decl_type == Some(DeclType::Enum)) {
            return Ok(format!("{}.{}", t.decl, legalize_lower(&ci.name, Context::EnumMember)));
        }
        if self.root.decl_type(identifier).is_none() {
            return Err(FidlgenError::UnknownIdentifier(identifier.clone()));
        }
        Ok(self.compile_lower_camel_compound_identifier(&ci, "", Context::Constant))
    }

    /// `Enum.member` or `Bits.member` for a `lib/Decl.MEMBER` reference.
    fn compile_member_reference(&self, identifier: &str, ci: &CompoundIdentifier, member: &str) -> Result<String> {
        let base = CompoundIdentifier { member: None, ..ci.clone() };
        let ctx = match self.root.decl_type(&base.to_string()) {
            Some(DeclType::Enum) => Context::EnumMember,
            Some(DeclType::Bits) => Context::BitsMember,
            _ => return Err(FidlgenError::UnknownIdentifier(identifier.to_string())),
        };
        Ok(format!(
            "{}.{}",
            self.compile_upper_camel_compound_identifier(&base, "", Context::Declaration),
            legalize_lower(member, ctx)
        ))
    }

    pub fn compile_const(&self, val: &schema::Const) -> Result<model::Const> {
        let ci = CompoundIdentifier::parse(&val.name)?;
        let type_ = self.compile_type(&val.type_)?;
        let value = self.compile_constant(&val.value, Some(&type_))?;
        Ok(model::Const {
            type_,
            name: self.compile_lower_camel_compound_identifier(&ci, "", Context::Constant),
            value,
            doc: doc_string(val),
        })
    }

    pub fn compile_enum(&self, val: &schema::Enum) -> Result<model::Enum> {
        let ci = CompoundIdentifier::parse(&val.name)?;
        let name = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);
        let members = val
            .members
            .iter()
            .map(|m| {
                Ok(model::EnumMember {
                    name:  legalize_lower(&m.name, Context::EnumMember),
                    value: self.compile_constant(&m.value, None)?,
                    doc:   doc_string(m),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let type_expr = format!(
            "$fidl.EnumType<{}>(type: $fidl.{}Type(), ctor: {}._ctor)",
            name,
            primitive_wire_name(val.type_),
            name
        );
        Ok(model::Enum {
            type_symbol: self.type_symbol(&ci),
            name,
            members,
            type_expr,
            doc: doc_string(val),
        })
    }

    pub fn compile_bits(&self, val: &schema::Bits) -> Result<model::Bits> {
        let subtype = match &val.type_.kind {
            TypeKind::Primitive { subtype } => *subtype,
            _ => return Err(FidlgenError::BitsNotPrimitive(val.name.clone())),
        };
        let ci = CompoundIdentifier::parse(&val.name)?;
        let name = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);
        let members = val
            .members
            .iter()
            .map(|m| {
                Ok(model::BitsMember {
                    name:  legalize_lower(&m.name, Context::BitsMember),
                    value: self.compile_constant(&m.value, None)?,
                    doc:   doc_string(m),
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let type_expr = format!(
            "$fidl.BitsType<{}>(type: $fidl.{}Type(), ctor: {}._ctor)",
            name,
            primitive_wire_name(subtype),
            name
        );
        Ok(model::Bits {
            type_symbol: self.type_symbol(&ci),
            name,
            members,
            type_expr,
            doc: doc_string(val),
        })
    }

    pub fn compile_parameter(&self, name: &str, type_: &schema::Type, offset: u32) -> Result<model::Parameter> {
        let t = self.compile_type(type_)?;
        Ok(model::Parameter {
            type_expr: member_type_expr(&t, offset),
            type_: t,
            name: legalize_lower(name, Context::Parameter),
            offset,
        })
    }

    pub fn compile_parameter_array(&self, params: &[schema::Parameter]) -> Result<Vec<model::Parameter>> {
        params
            .iter()
            .map(|p| self.compile_parameter(&p.name, &p.type_, p.offset))
            .collect()
    }

    fn compile_method(&self, iface: &str, val: &schema::Method) -> Result<model::Method> {
        let request = self.compile_parameter_array(&val.maybe_request)?;
        let response = self.compile_method_response(val)?;

        let async_response_class = if response.method_parameters.len() > 1 {
            Some(format!("{}${}$Response", iface, val.name))
        } else {
            None
        };
        let async_response_type = if val.has_response {
            Some(match response.method_parameters.as_slice() {
                [] => "void".to_string(),
                [single] => single.type_.decl.clone(),
                _ => async_response_class.clone().unwrap_or_default(),
            })
        } else {
            None
        };

        Ok(model::Method {
            ordinal: val.ordinal,
            ordinal_name: format!("_k{}_{}_Ordinal", iface, val.name),
            name: legalize_lower(&val.name, Context::Method),
            has_request: val.has_request,
            request_size: val.maybe_request_size,
            has_response: val.has_response,
            response_size: val.maybe_response_size,
            async_response_class,
            async_response_type,
            callback_type: format!("{}{}Callback", iface, legalize_upper(&val.name, Context::Method)),
            type_symbol: format!("_k{}_{}_Type", iface, val.name),
            type_expr: method_type_expr(
                &request,
                &response.wire_parameters,
                &format!("{}.{}", iface, val.name),
            ),
            transitional: val.has_attribute("Transitional"),
            doc: doc_string(val),
            request,
            response,
        })
    }

    pub fn compile_interface(&self, val: &schema::Interface) -> Result<model::Interface> {
        let ci = CompoundIdentifier::parse(&val.name)?;
        let name = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);
        let service_name = if val.has_attribute("Discoverable") {
            quote_dart_string(&format!("{}.{}", ci.library, ci.name))
        } else {
            "null".to_string()
        };

        let methods = val
            .methods
            .iter()
            .map(|m| self.compile_method(&name, m))
            .collect::<Result<Vec<_>>>()?;
        let has_events = methods.iter().any(model::Method::is_event);

        Ok(model::Interface {
            service_name,
            service_data: self.compile_upper_camel_compound_identifier(&ci, "Data", Context::Declaration),
            proxy_name: self.compile_upper_camel_compound_identifier(&ci, "Proxy", Context::Declaration),
            binding_name: self.compile_upper_camel_compound_identifier(&ci, "Binding", Context::Declaration),
            events_name: self.compile_upper_camel_compound_identifier(&ci, "Events", Context::Declaration),
            name,
            methods,
            has_events,
            doc: doc_string(val),
        })
    }

    fn compile_struct_member(&self, val: &schema::StructMember) -> Result<model::StructMember> {
        let t = self.compile_type(&val.type_)?;
        let default_value = match &val.maybe_default_value {
            Some(value) => Some(self.compile_constant(value, Some(&t))?),
            None => None,
        };
        Ok(model::StructMember {
            type_expr: member_type_expr(&t, val.offset),
            type_: t,
            name: legalize_lower(&val.name, Context::StructMember),
            default_value,
            offset: val.offset,
            doc: doc_string(val),
        })
    }

    pub fn compile_struct(&self, val: &schema::Struct) -> Result<model::Struct> {
        let ci = CompoundIdentifier::parse(&val.name)?;
        let name = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);

        let members = if val.members.is_empty() {
            vec![self.compile_struct_member(&schema::StructMember::empty(EMPTY_STRUCT_MEMBER))?]
        } else {
            val.members
                .iter()
                .map(|m| self.compile_struct_member(m))
                .collect::<Result<Vec<_>>>()?
        };
        let has_nullable_field = members.iter().any(|m| m.type_.nullable);

        let exprs: Vec<&str> = members.iter().map(|m| m.type_expr.as_str()).collect();
        let type_expr = composite_type_expr("StructType", &name, val.size, &format_member_list(&exprs), false);

        Ok(model::Struct {
            type_symbol: self.type_symbol(&ci),
            name,
            members,
            type_expr,
            has_nullable_field,
            doc: doc_string(val),
        })
    }

    pub fn compile_table(&self, val: &schema::Table) -> Result<model::Table> {
        let ci = CompoundIdentifier::parse(&val.name)?;
        let name = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);

        let mut members = Vec::new();
        for m in val.members.iter().filter(|m| !m.reserved) {
            let (member_name, member_type) = match (&m.name, &m.type_) {
                (Some(n), Some(t)) => (n, t),
                _ => {
                    return Err(FidlgenError::IncompleteTableMember {
                        table:   val.name.clone(),
                        ordinal: m.ordinal,
                    })
                }
            };
            let t = self.compile_type(member_type)?;
            let default_value = match &m.maybe_default_value {
                Some(value) => Some(self.compile_constant(value, Some(&t))?),
                None => None,
            };
            members.push(model::TableMember {
                ordinal: m.ordinal,
                type_: t,
                name: legalize_lower(member_name, Context::TableMember),
                default_value,
                doc: doc_string(m),
            });
        }

        let entries: Vec<(u32, &str)> = members.iter().map(|m| (m.ordinal, m.type_.type_expr.as_str())).collect();
        let type_expr = composite_type_expr("TableType", &name, val.size, &format_ordinal_map(&entries), false);

        Ok(model::Table {
            type_symbol: self.type_symbol(&ci),
            name,
            members,
            type_expr,
            doc: doc_string(val),
        })
    }

    pub fn compile_union(&self, val: &schema::Union) -> Result<model::Union> {
        let ci = CompoundIdentifier::parse(&val.name)?;
        let name = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);

        let members = val
            .members
            .iter()
            .map(|m| {
                let t = self.compile_type(&m.type_)?;
                Ok(model::UnionMember {
                    type_expr: member_type_expr(&t, m.offset),
                    type_:     t,
                    name:      legalize_lower(&m.name, Context::UnionMember),
                    ctor_name: legalize_upper(&m.name, Context::UnionMember),
                    tag:       legalize_lower(&m.name, Context::UnionMemberTag),
                    offset:    m.offset,
                    doc:       doc_string(m),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let exprs: Vec<&str> = members.iter().map(|m| m.type_expr.as_str()).collect();
        let type_expr = composite_type_expr("UnionType", &name, val.size, &format_member_list(&exprs), false);

        Ok(model::Union {
            tag_name: self.compile_upper_camel_compound_identifier(&ci, "Tag", Context::Declaration),
            type_symbol: self.type_symbol(&ci),
            name,
            members,
            type_expr,
            doc: doc_string(val),
        })
    }

    pub fn compile_xunion(&self, val: &schema::XUnion) -> Result<model::XUnion> {
        let ci = CompoundIdentifier::parse(&val.name)?;
        let name = self.compile_upper_camel_compound_identifier(&ci, "", Context::Declaration);

        let members = val
            .members
            .iter()
            .map(|m| {
                Ok(model::XUnionMember {
                    ordinal:   m.ordinal,
                    type_:     self.compile_type(&m.type_)?,
                    name:      legalize_lower(&m.name, Context::UnionMember),
                    ctor_name: legalize_upper(&m.name, Context::UnionMember),
                    tag:       legalize_lower(&m.name, Context::UnionMemberTag),
                    offset:    m.offset,
                    doc:       doc_string(m),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let entries: Vec<(u32, &str)> = members.iter().map(|m| (m.ordinal, m.type_.type_expr.as_str())).collect();
        let member_map = format_ordinal_map(&entries);

        Ok(model::XUnion {
            tag_name: self.compile_upper_camel_compound_identifier(&ci, "Tag", Context::Declaration),
            type_symbol: self.type_symbol(&ci),
            type_expr: composite_type_expr("XUnionType", &name, val.size, &member_map, false),
            opt_type_symbol: self.opt_type_symbol(&ci),
            opt_type_expr: composite_type_expr("XUnionType", &name, val.size, &member_map, true),
            name,
            members,
            doc: doc_string(val),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brine_fidl_schema::{Literal, Root};

    fn root() -> Root {
        Root::from_json(
            r#"{
                "name": "fidl.test",
                "library_dependencies": [
                    {"name": "fidl.other", "declarations": {"fidl.other/MAX": "const"}}
                ],
                "declarations": {
                    "fidl.test/Color": "enum",
                    "fidl.test/Flags": "bits",
                    "fidl.test/LIMIT": "const"
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn empty_struct_gets_a_placeholder_member() {
        let root = root();
        let c = Compiler::new(&root);
        let s = c
            .compile_struct(&schema::Struct {
                name:             "fidl.test/Empty".to_string(),
                members:          Vec::new(),
                size:             1,
                maybe_attributes: Vec::new(),
            })
            .unwrap();
        assert_eq!(s.members.len(), 1);
        assert_eq!(s.members[0].name, "reserved");
        assert_eq!(s.members[0].type_.decl, "int");
        assert_eq!(s.members[0].offset, 0);
        assert!(!s.has_nullable_field);
        assert_eq!(
            s.type_expr,
            "$fidl.StructType<Empty>(\n  encodedSize: 1,\n  members: <$fidl.MemberType>[\n    \
             $fidl.MemberType<int>(type: $fidl.Uint8Type(), offset: 0),\n  ],\n  ctor: Empty._ctor,\n)"
        );
    }

    #[test]
    fn all_reserved_table_has_no_members() {
        let root = root();
        let c = Compiler::new(&root);
        let table: schema::Table = serde_json::from_str(
            r#"{"name": "fidl.test/Sparse", "size": 16,
                "members": [{"ordinal": 1, "reserved": true}, {"ordinal": 2, "reserved": true}]}"#,
        )
        .unwrap();
        let t = c.compile_table(&table).unwrap();
        assert!(t.members.is_empty());
        assert!(t.type_expr.contains("members: <int, $fidl.FidlType>{},"));
    }

    #[test]
    fn constants_and_member_references() {
        let root = root();
        let c = Compiler::new(&root);
        let literal = Constant::Literal { literal: Literal::Numeric { value: "255".to_string() } };
        assert_eq!(c.compile_constant(&literal, None).unwrap(), "0xff");

        let member = Constant::Identifier { identifier: "fidl.test/Color.DARK_RED".to_string() };
        assert_eq!(c.compile_constant(&member, None).unwrap(), "Color.darkRed");

        let flag = Constant::Identifier { identifier: "fidl.test/Flags.WRITE".to_string() };
        assert_eq!(c.compile_constant(&flag, None).unwrap(), "Flags.write");

        let local = Constant::Identifier { identifier: "fidl.test/LIMIT".to_string() };
        assert_eq!(c.compile_constant(&local, None).unwrap(), "limit");

        let external = Constant::Identifier { identifier: "fidl.other/MAX".to_string() };
        assert_eq!(c.compile_constant(&external, None).unwrap(), "lib$fidl_other.max");

        let missing = Constant::Identifier { identifier: "fidl.test/Nope".to_string() };
        assert!(matches!(
            c.compile_constant(&missing, None),
            Err(FidlgenError::UnknownIdentifier(_))
        ));
    }

    #[test]
    fn enum_typed_constants_are_qualified() {
        let root = root();
        let c = Compiler::new(&root);
        let color = c.compile_type(&schema::Type::identifier("fidl.test/Color", false)).unwrap();
        let value = Constant::Identifier { identifier: "fidl.test/RED".to_string() };
        assert_eq!(c.compile_constant(&value, Some(&color)).unwrap(), "Color.red");
    }

    #[test]
    fn bits_require_a_primitive_type() {
        let root = root();
        let c = Compiler::new(&root);
        let bits: schema::Bits = serde_json::from_str(
            r#"{"name": "fidl.test/Flags", "type": {"kind": "string"}, "members": []}"#,
        )
        .unwrap();
        assert!(matches!(c.compile_bits(&bits), Err(FidlgenError::BitsNotPrimitive(ref n)) if n == "fidl.test/Flags"));
    }

    #[test]
    fn reserved_member_names_are_escaped() {
        let root = root();
        let c = Compiler::new(&root);
        let s: schema::Struct = serde_json::from_str(
            r#"{"name": "fidl.test/list", "size": 1, "members": [
                {"name": "bool", "type": {"kind": "primitive", "subtype": "bool"}, "offset": 0}
            ]}"#,
        )
        .unwrap();
        let s = c.compile_struct(&s).unwrap();
        assert_eq!(s.name, "List$");
        assert_eq!(s.type_symbol, "klist_Type");
        assert_eq!(s.members[0].name, "bool$");
    }
}
