//! Emission of data declarations: constants, enums, bits, structs, tables
//! and both kinds of union.

use super::doc_lines;
use crate::model::{Bits, Const, Enum, Struct, Table, Union, XUnion};

pub fn const_declaration(c: &Const) -> String {
    let mut lines = doc_lines(&c.doc, "");
    lines.push(format!("const {} {} = {};", c.type_.decl, c.name, c.value));
    lines.join("\n")
}

pub fn enum_declaration(e: &Enum) -> String {
    let name = &e.name;
    let mut lines = doc_lines(&e.doc, "");
    lines.push(format!("class {} extends $fidl.Enum {{", name));
    lines.push(format!("  factory {}(int _v) {{", name));
    lines.push("    switch (_v) {".to_string());
    for m in &e.members {
        lines.push(format!("      case {}:", m.value));
        lines.push(format!("        return {};", m.name));
    }
    lines.push("      default:".to_string());
    lines.push("        return null;".to_string());
    lines.push("    }".to_string());
    lines.push("  }".to_string());
    for m in &e.members {
        lines.extend(doc_lines(&m.doc, "  "));
        lines.push(format!("  static const {0} {1} = {0}._({2});", name, m.name, m.value));
    }
    lines.push(String::new());
    lines.push(format!("  const {}._(this.$value);", name));
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  final int $value;".to_string());
    lines.push(String::new());
    lines.push(format!("  static const Map<String, {}> $valuesMap = {{", name));
    for m in &e.members {
        lines.push(format!("    r'{0}': {0},", m.name));
    }
    lines.push("  };".to_string());
    lines.push(String::new());
    lines.push(format!("  static const List<{}> $values = [", name));
    for m in &e.members {
        lines.push(format!("    {},", m.name));
    }
    lines.push("  ];".to_string());
    lines.push(String::new());
    lines.push(format!("  static {} $valueOf(String name) => $valuesMap[name];", name));
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  String toString() {".to_string());
    lines.push("    switch ($value) {".to_string());
    for m in &e.members {
        lines.push(format!("      case {}:", m.value));
        lines.push(format!("        return r'{}.{}';", name, m.name));
    }
    lines.push("      default:".to_string());
    lines.push("        return null;".to_string());
    lines.push("    }".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());
    lines.push(format!("  static {0} _ctor(int v) => {0}(v);", name));
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push(format!("const $fidl.EnumType<{}> {} = {};", name, e.type_symbol, e.type_expr));
    lines.join("\n")
}

pub fn bits_declaration(b: &Bits) -> String {
    let name = &b.name;
    let mut lines = doc_lines(&b.doc, "");
    lines.push(format!("class {} extends $fidl.Bits {{", name));
    for m in &b.members {
        lines.extend(doc_lines(&m.doc, "  "));
        lines.push(format!("  static const {0} {1} = {0}._({2});", name, m.name, m.value));
    }
    lines.push(format!("  static const {0} $none = {0}._(0);", name));
    lines.push(String::new());
    lines.push(format!("  const {}._(this.$value);", name));
    lines.push(String::new());
    for op in ["|", "&"] {
        lines.push(format!("  {0} operator {1}({0} other) {{", name, op));
        lines.push(format!("    return {}._($value {} other.$value);", name, op));
        lines.push("  }".to_string());
        lines.push(String::new());
    }
    lines.push("  @override".to_string());
    lines.push("  final int $value;".to_string());
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  String toString() {".to_string());
    lines.push("    if ($value == null) {".to_string());
    lines.push("      return null;".to_string());
    lines.push("    }".to_string());
    lines.push("    List<String> parts = [];".to_string());
    for m in &b.members {
        lines.push(format!("    if ($value & {} != 0) {{", m.value));
        lines.push(format!("      parts.add(r'{}.{}');", name, m.name));
        lines.push("    }".to_string());
    }
    lines.push("    if (parts.isEmpty) {".to_string());
    lines.push(format!("      return r'{}.$none';", name));
    lines.push("    } else {".to_string());
    lines.push("      return parts.join(\" | \");".to_string());
    lines.push("    }".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());
    lines.push(format!("  static {0} _ctor(int v) => {0}._(v);", name));
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push(format!("const $fidl.BitsType<{}> {} = {};", name, b.type_symbol, b.type_expr));
    lines.join("\n")
}

/// Comment pair that precedes constants which may refer to themselves.
const RECURSIVE_CONST_IGNORE: [&str; 2] = [
    "// See FIDL-308:",
    "// ignore: recursive_compile_time_constant",
];

pub fn struct_declaration(s: &Struct) -> String {
    let name = &s.name;
    let mut lines = doc_lines(&s.doc, "");
    lines.push(format!("class {} extends $fidl.Struct {{", name));

    lines.push(format!("  const {}({{", name));
    for m in &s.members {
        let required = if !m.type_.nullable && m.default_value.is_none() { "@required " } else { "" };
        let default = m.default_value.as_ref().map(|v| format!(": {}", v)).unwrap_or_default();
        lines.push(format!("    {}this.{}{},", required, m.name, default));
    }
    lines.push("  });".to_string());

    lines.push(format!("  {0}.clone({0} $orig, {{", name));
    for m in &s.members {
        lines.push(format!("    {} {},", m.type_.decl, m.name));
    }
    lines.push("  }) : this(".to_string());
    for m in &s.members {
        lines.push(format!("      {0}: {0} ?? $orig.{0},", m.name));
    }
    lines.push("    );".to_string());

    if s.has_nullable_field {
        lines.push(String::new());
        lines.push(format!("  {0}.cloneWithout({0} $orig, {{", name));
        for m in s.members.iter().filter(|m| m.type_.nullable) {
            lines.push(format!("    bool {},", m.name));
        }
        lines.push("  }) : this(".to_string());
        for m in &s.members {
            if m.type_.nullable {
                lines.push(format!("      {0}: {0} ? null : $orig.{0},", m.name));
            } else {
                lines.push(format!("      {0}: $orig.{0},", m.name));
            }
        }
        lines.push("    );".to_string());
    }

    lines.push(String::new());
    lines.push(format!("  {}._(List<Object> argv)", name));
    let inits: Vec<String> = s
        .members
        .iter()
        .enumerate()
        .map(|(i, m)| format!("{} = argv[{}]", m.name, i))
        .collect();
    lines.push(format!("      : {};", inits.join(",\n        ")));
    for m in &s.members {
        lines.extend(doc_lines(&m.doc, "  "));
        lines.push(format!("  final {} {};", m.type_.decl, m.name));
    }
    lines.push(String::new());

    lines.push("  @override".to_string());
    lines.push("  List<Object> get $fields {".to_string());
    lines.push("    return <Object>[".to_string());
    for m in &s.members {
        lines.push(format!("      {},", m.name));
    }
    lines.push("    ];".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());

    let fields: Vec<String> = s
        .members
        .iter()
        .enumerate()
        .map(|(i, m)| {
            let sep = if i == 0 { "" } else { ", " };
            format!("{}{}: ' + {}.toString() + r'", sep, m.name, m.name)
        })
        .collect();
    lines.push("  @override".to_string());
    lines.push("  String toString() {".to_string());
    lines.push("    // ignore: prefer_interpolation_to_compose_strings".to_string());
    lines.push(format!("    return r'{}' r'({})';", name, fields.concat()));
    lines.push("  }".to_string());
    lines.push(String::new());
    lines.push(format!("  static {0} _ctor(List<Object> argv) => {0}._(argv);", name));
    lines.push("}".to_string());
    lines.push(String::new());
    lines.extend(RECURSIVE_CONST_IGNORE.iter().map(|l| l.to_string()));
    lines.push(format!("const $fidl.StructType<{}> {} = {};", name, s.type_symbol, s.type_expr));
    lines.join("\n")
}

pub fn table_declaration(t: &Table) -> String {
    let name = &t.name;
    let mut lines = doc_lines(&t.doc, "");
    lines.push(format!("class {} extends $fidl.Table {{", name));
    lines.push(format!("  const {}({{", name));
    for m in &t.members {
        let default = m.default_value.as_ref().map(|v| format!(": {}", v)).unwrap_or_default();
        lines.push(format!("    this.{}{},", m.name, default));
    }
    lines.push("  });".to_string());
    lines.push(String::new());

    if t.members.is_empty() {
        lines.push(format!("  {}._(Map<int, dynamic> argv);", name));
    } else {
        lines.push(format!("  {}._(Map<int, dynamic> argv)", name));
        let inits: Vec<String> = t
            .members
            .iter()
            .map(|m| format!("{} = argv[{}]", m.name, m.ordinal))
            .collect();
        lines.push(format!("      : {};", inits.join(",\n        ")));
    }
    for m in &t.members {
        lines.extend(doc_lines(&m.doc, "  "));
        lines.push(format!("  final {} {};", m.type_.decl, m.name));
    }
    lines.push(String::new());

    lines.push("  @override".to_string());
    lines.push("  Map<int, dynamic> get $fields {".to_string());
    lines.push("    return {".to_string());
    for m in &t.members {
        lines.push(format!("      {}: {},", m.ordinal, m.name));
    }
    lines.push("    };".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());
    lines.push(format!("  static {0} _ctor(Map<int, dynamic> argv) => {0}._(argv);", name));
    lines.push("}".to_string());
    lines.push(String::new());
    lines.extend(RECURSIVE_CONST_IGNORE.iter().map(|l| l.to_string()));
    lines.push(format!("const $fidl.TableType<{}> {} = {};", name, t.type_symbol, t.type_expr));
    lines.join("\n")
}

pub fn union_declaration(u: &Union) -> String {
    let name = &u.name;
    let tag_name = &u.tag_name;
    let mut lines = vec![format!("enum {} {{", tag_name)];
    for m in &u.members {
        lines.push(format!("  {},", m.tag));
    }
    lines.push("}".to_string());
    lines.push(String::new());

    lines.extend(doc_lines(&u.doc, ""));
    lines.push(format!("class {} extends $fidl.Union {{", name));
    for m in &u.members {
        lines.push(String::new());
        lines.push(format!("  const {}.with{}({} value)", name, m.ctor_name, m.type_.decl));
        lines.push(format!("      : _data = value, _tag = {}.{};", tag_name, m.tag));
    }
    lines.push(String::new());
    lines.push(format!("  {}._({} tag, Object data) : _tag = tag, _data = data;", name, tag_name));
    lines.push(String::new());
    lines.push(format!("  final {} _tag;", tag_name));
    lines.push("  final _data;".to_string());
    for m in &u.members {
        lines.push(String::new());
        lines.extend(doc_lines(&m.doc, "  "));
        lines.push(format!("  {} get {} {{", m.type_.decl, m.name));
        lines.push(format!("    if (_tag != {}.{}) {{", tag_name, m.tag));
        lines.push("      return null;".to_string());
        lines.push("    }".to_string());
        lines.push("    return _data;".to_string());
        lines.push("  }".to_string());
    }
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  String toString() {".to_string());
    lines.push("    switch (_tag) {".to_string());
    for m in &u.members {
        lines.push(format!("      case {}.{}:", tag_name, m.tag));
        lines.push(format!("        return r'{}.{}(${})';", name, m.name, m.name));
    }
    lines.push("      default:".to_string());
    lines.push("        return null;".to_string());
    lines.push("    }".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());
    lines.push(format!("  {} get $tag => _tag;", tag_name));
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  int get $index => _tag.index;".to_string());
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  Object get $data => _data;".to_string());
    lines.push(String::new());
    lines.push(format!("  static {} _ctor(int index, Object data) {{", name));
    lines.push(format!("    return {}._({}.values[index], data);", name, tag_name));
    lines.push("  }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
    lines.extend(RECURSIVE_CONST_IGNORE.iter().map(|l| l.to_string()));
    lines.push(format!("const $fidl.UnionType<{}> {} = {};", name, u.type_symbol, u.type_expr));
    lines.join("\n")
}

pub fn xunion_declaration(x: &XUnion) -> String {
    let name = &x.name;
    let tag_name = &x.tag_name;
    let mut lines = vec![format!("enum {} {{", tag_name)];
    for m in &x.members {
        lines.push(format!("  {}, // {:#x}", m.tag, m.ordinal));
    }
    lines.push("}".to_string());
    lines.push(String::new());
    lines.push(format!("const Map<int, {0}> _{0}_map = {{", tag_name));
    for m in &x.members {
        lines.push(format!("  {}: {}.{},", m.ordinal, tag_name, m.tag));
    }
    lines.push("};".to_string());
    lines.push(String::new());

    lines.extend(doc_lines(&x.doc, ""));
    lines.push(format!("class {} extends $fidl.XUnion {{", name));
    for m in &x.members {
        lines.push(String::new());
        lines.push(format!("  const {}.with{}({} value)", name, m.ctor_name, m.type_.decl));
        lines.push(format!("      : _ordinal = {}, _data = value;", m.ordinal));
    }
    lines.push(String::new());
    lines.push(format!("  {}._(int ordinal, Object data) : _ordinal = ordinal, _data = data;", name));
    lines.push(String::new());
    lines.push("  final int _ordinal;".to_string());
    lines.push("  final _data;".to_string());
    lines.push(String::new());
    lines.push(format!("  {0} get $tag => _{0}_map[_ordinal];", tag_name));
    for m in &x.members {
        lines.push(String::new());
        lines.extend(doc_lines(&m.doc, "  "));
        lines.push(format!("  {} get {} {{", m.type_.decl, m.name));
        lines.push(format!("    if (_ordinal != {}) {{", m.ordinal));
        lines.push("      return null;".to_string());
        lines.push("    }".to_string());
        lines.push("    return _data;".to_string());
        lines.push("  }".to_string());
    }
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  String toString() {".to_string());
    lines.push("    switch (_ordinal) {".to_string());
    for m in &x.members {
        lines.push(format!("      case {}:", m.ordinal));
        lines.push(format!("        return r'{}.{}(${})';", name, m.name, m.name));
    }
    lines.push("      default:".to_string());
    lines.push("        return null;".to_string());
    lines.push("    }".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  int get $ordinal => _ordinal;".to_string());
    lines.push(String::new());
    lines.push("  @override".to_string());
    lines.push("  Object get $data => _data;".to_string());
    lines.push(String::new());
    lines.push(format!("  static {0} _ctor(int ordinal, Object data) {{", name));
    lines.push(format!("    return {}._(ordinal, data);", name));
    lines.push("  }".to_string());
    lines.push("}".to_string());
    lines.push(String::new());
    lines.extend(RECURSIVE_CONST_IGNORE.iter().map(|l| l.to_string()));
    lines.push(format!("const $fidl.XUnionType<{}> {} = {};", name, x.type_symbol, x.type_expr));
    lines.push(format!("const $fidl.XUnionType<{}> {} = {};", name, x.opt_type_symbol, x.opt_type_expr));
    lines.join("\n")
}
