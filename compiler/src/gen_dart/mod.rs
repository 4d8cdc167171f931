//! Dart source emission.
//!
//! Every function here is a pure function of the compiled model, so the same
//! model always renders to the same bytes.

pub mod data;
pub mod interface;
pub mod interface_async;

use crate::model::{Parameter, Root};

pub const HEADER: &str = "// WARNING: This file is machine generated by fidlgen.";

const LINT_IGNORES: &[&str] = &[
    "always_specify_types",
    "avoid_positional_boolean_parameters",
    "avoid_returning_null",
    "cascade_invocations",
    "constant_identifier_names",
    "one_member_abstracts",
    "prefer_constructors_over_static_methods",
    "prefer_single_quotes",
    "public_member_api_docs",
    "unused_import",
    "unused_local_variable",
    "non_constant_identifier_names",
    "library_prefixes",
    "prefer_typing_uninitialized_variables",
    "avoid_js_rounded_ints",
    "unnecessary_parenthesis",
    "always_put_required_named_parameters_first",
    "prefer_generic_function_type_aliases",
    "prefer_equal_for_default_values",
    "avoid_catches_without_on_clauses",
    "unused_shown_name",
    "unnecessary_lambdas",
];

const RUNTIME_IMPORTS: &[&str] = &[
    "import 'dart:async';",
    "import 'dart:core' hide Set;",
    "import 'dart:developer';",
    "import 'dart:typed_data';",
    "",
    "import 'package:fidl/fidl.dart' as $fidl;",
    "import 'package:meta/meta.dart';",
    "import 'package:zircon/zircon.dart' as $zx;",
];

/// The three files generated for each library.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingFile {
    Sync,
    Async,
    Test,
}

impl BindingFile {
    pub const ALL: [BindingFile; 3] = [BindingFile::Sync, BindingFile::Async, BindingFile::Test];

    pub fn file_name(self) -> &'static str {
        match self {
            BindingFile::Sync => "fidl.dart",
            BindingFile::Async => "fidl_async.dart",
            BindingFile::Test => "fidl_test.dart",
        }
    }

    pub fn render(self, root: &Root) -> String {
        match self {
            BindingFile::Sync => generate_library_file(root),
            BindingFile::Async => generate_async_file(root),
            BindingFile::Test => generate_test_file(root),
        }
    }
}

pub(crate) fn doc_lines(doc: &[String], indent: &str) -> Vec<String> {
    doc.iter().map(|line| format!("{}///{}", indent, line)).collect()
}

/// `int foo, String bar`
pub(crate) fn params(params: &[Parameter]) -> String {
    params
        .iter()
        .map(|p| format!("{} {}", p.type_.decl, p.name))
        .collect::<Vec<_>>()
        .join(", ")
}

fn preamble(library: &str, imports: Vec<String>) -> Vec<String> {
    let mut lines = vec![HEADER.to_string(), String::new(), format!("library {};", library), String::new()];
    lines.extend(RUNTIME_IMPORTS.iter().map(|l| l.to_string()));
    lines.push(String::new());
    if !imports.is_empty() {
        lines.extend(imports);
        lines.push(String::new());
    }
    lines.extend(LINT_IGNORES.iter().map(|lint| format!("// ignore_for_file: {}", lint)));
    lines
}

/// Appends each block after a blank separator line.
fn push_blocks(lines: &mut Vec<String>, blocks: impl IntoIterator<Item = String>) {
    for block in blocks {
        lines.push(String::new());
        lines.push(block);
    }
}

fn data_declarations(root: &Root) -> Vec<String> {
    let mut blocks = Vec::new();
    blocks.extend(root.consts.iter().map(data::const_declaration));
    blocks.extend(root.enums.iter().map(data::enum_declaration));
    blocks.extend(root.bits.iter().map(data::bits_declaration));
    blocks.extend(root.unions.iter().map(data::union_declaration));
    blocks.extend(root.xunions.iter().map(data::xunion_declaration));
    blocks.extend(root.structs.iter().map(data::struct_declaration));
    blocks.extend(root.tables.iter().map(data::table_declaration));
    blocks
}

fn finish(mut lines: Vec<String>) -> String {
    while lines.last().map_or(false, |l| l.is_empty()) {
        lines.pop();
    }
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// `fidl.dart`: data declarations plus callback-style bindings.
pub fn generate_library_file(root: &Root) -> String {
    let imports = root
        .imports
        .iter()
        .map(|i| format!("import '{}' as {};", i.url, i.local_name))
        .collect();
    let mut lines = preamble(&root.library_name, imports);
    push_blocks(&mut lines, data_declarations(root));
    push_blocks(&mut lines, root.interfaces.iter().map(interface::interface_declaration));
    finish(lines)
}

/// `fidl_async.dart`: data declarations plus future/stream bindings.
pub fn generate_async_file(root: &Root) -> String {
    let mut imports = vec!["import './fidl.dart' as $sync;".to_string()];
    for i in &root.imports {
        imports.push(format!("import '{}' as {};", i.async_url, i.local_name));
        imports.push(format!("import '{}' as sync${};", i.url, i.local_name));
    }
    let mut lines = preamble(&format!("{}_async", root.library_name), imports);
    push_blocks(&mut lines, data_declarations(root));
    push_blocks(&mut lines, root.interfaces.iter().map(interface_async::interface_async_declaration));
    finish(lines)
}

/// `fidl_test.dart`: base classes whose methods all fail, for tests to
/// override selectively.
pub fn generate_test_file(root: &Root) -> String {
    let mut imports = vec!["import './fidl_async.dart';".to_string()];
    imports.extend(
        root.imports
            .iter()
            .map(|i| format!("import '{}' as {};", i.async_url, i.local_name)),
    );
    let mut lines = preamble(&format!("{}_test", root.library_name), imports);
    push_blocks(&mut lines, root.interfaces.iter().map(interface_async::interface_test_declaration));
    finish(lines)
}
