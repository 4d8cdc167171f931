#![cfg(test)]

use brine_fidl_schema::{Attributed, DeclType, Root, SchemaError, TypeKind};
use std::path::PathBuf;

fn echo_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../compiler/tests/fixtures/echo.json")
}

#[test]
fn test_load_fixture() {
    let root = Root::load(&echo_path()).expect("fixture should load");

    assert_eq!(root.name, "fidl.examples.echo");
    assert_eq!(root.library_dependencies.len(), 2);
    assert_eq!(root.decl_type("fuchsia.mem/Buffer"), Some(DeclType::Struct));
    assert_eq!(root.decl_type("fidl.examples.echo/Shape"), Some(DeclType::XUnion));

    let echo = &root.interface_declarations[0];
    assert!(echo.has_attribute("Discoverable"));
    assert_eq!(echo.methods.len(), 5);
    assert!(!echo.methods[2].has_request);
    assert!(echo.methods[4].has_attribute("Transitional"));

    let sparse = &root.table_declarations[0];
    assert!(sparse.members[0].reserved);
    assert!(sparse.members[0].name.is_none());
    assert!(matches!(
        sparse.members[1].type_.as_ref().map(|t| &t.kind),
        Some(TypeKind::Vector { .. })
    ));

    assert!(root.find_union("fidl.examples.echo/EchoReverseResult").is_some());
    assert!(root.find_struct("fidl.examples.echo/EchoReverseResponse").is_some());
    assert!(root.find_struct("fidl.examples.echo/Missing").is_none());
}

#[test]
fn test_load_errors() {
    let missing = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/does-not-exist.json");
    assert!(matches!(Root::load(&missing), Err(SchemaError::Io(_))));
    assert!(matches!(Root::from_json("{\"name\": 3}"), Err(SchemaError::Json(_))));
}
