use crate::error::{FidlgenError, Result};
use brine_fidl_schema::{DeclType, Root};
use std::collections::HashSet;

fn decl_type_name(kind: DeclType) -> String {
    format!("{:?}", kind).to_lowercase()
}

/// Checks that every declaration in the per-kind lists is indexed under the
/// same kind in `declarations`, and that no name is declared twice.
pub fn verify_root(root: &Root) -> Result<()> {
    let listed: Vec<(&str, DeclType)> = root
        .const_declarations
        .iter()
        .map(|d| (d.name.as_str(), DeclType::Const))
        .chain(root.enum_declarations.iter().map(|d| (d.name.as_str(), DeclType::Enum)))
        .chain(root.bits_declarations.iter().map(|d| (d.name.as_str(), DeclType::Bits)))
        .chain(root.interface_declarations.iter().map(|d| (d.name.as_str(), DeclType::Interface)))
        .chain(root.struct_declarations.iter().map(|d| (d.name.as_str(), DeclType::Struct)))
        .chain(root.table_declarations.iter().map(|d| (d.name.as_str(), DeclType::Table)))
        .chain(root.union_declarations.iter().map(|d| (d.name.as_str(), DeclType::Union)))
        .chain(root.xunion_declarations.iter().map(|d| (d.name.as_str(), DeclType::XUnion)))
        .collect();

    let mut seen: HashSet<&str> = HashSet::new();
    for (name, kind) in listed {
        if !seen.insert(name) {
            return Err(FidlgenError::DuplicateDeclaration(name.to_string()));
        }
        match root.declarations.get(name) {
            None => return Err(FidlgenError::UnknownIdentifier(name.to_string())),
            Some(indexed) if *indexed != kind => {
                return Err(FidlgenError::DeclTypeMismatch {
                    name:    name.to_string(),
                    listed:  decl_type_name(kind),
                    indexed: decl_type_name(*indexed),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn root(json: &str) -> Root {
        Root::from_json(json).unwrap()
    }

    const POINT: &str = r#"{"name": "fidl.test/Point", "size": 8, "members": []}"#;

    #[test]
    fn consistent_root_passes() {
        let r = root(&format!(
            r#"{{"name": "fidl.test", "struct_declarations": [{}],
                "declarations": {{"fidl.test/Point": "struct"}}}}"#,
            POINT
        ));
        assert!(verify_root(&r).is_ok());
    }

    #[test]
    fn duplicate_declarations_are_rejected() {
        let r = root(&format!(
            r#"{{"name": "fidl.test", "struct_declarations": [{0}, {0}],
                "declarations": {{"fidl.test/Point": "struct"}}}}"#,
            POINT
        ));
        assert!(matches!(verify_root(&r), Err(FidlgenError::DuplicateDeclaration(_))));
    }

    #[test]
    fn unindexed_declaration_is_rejected() {
        let r = root(&format!(r#"{{"name": "fidl.test", "struct_declarations": [{}]}}"#, POINT));
        assert!(matches!(verify_root(&r), Err(FidlgenError::UnknownIdentifier(ref n)) if n == "fidl.test/Point"));
    }

    #[test]
    fn kind_mismatch_is_rejected() {
        let r = root(&format!(
            r#"{{"name": "fidl.test", "struct_declarations": [{}],
                "declarations": {{"fidl.test/Point": "table"}}}}"#,
            POINT
        ));
        match verify_root(&r) {
            Err(FidlgenError::DeclTypeMismatch { listed, indexed, .. }) => {
                assert_eq!(listed, "struct");
                assert_eq!(indexed, "table");
            }
            other => panic!("unexpected result {:?}", other),
        }
    }
}
