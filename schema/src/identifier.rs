use crate::error::SchemaError;
use serde::Serialize;
use std::fmt;

/// A dotted library path such as `fuchsia.ui.input`, kept as its components.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct LibraryIdentifier(pub Vec<String>);

impl LibraryIdentifier {
    pub fn parse(name: &str) -> Self {
        LibraryIdentifier(
            name.split('.')
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn parts(&self) -> &[String] {
        &self.0
    }

    /// Components joined with `_`, the form used in Dart package and alias names.
    pub fn underscored(&self) -> String {
        self.0.join("_")
    }
}

impl fmt::Display for LibraryIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// A fully qualified declaration name, `library.path/Name` or
/// `library.path/Name.member`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct CompoundIdentifier {
    pub library: LibraryIdentifier,
    pub name:    String,
    pub member:  Option<String>,
}

impl CompoundIdentifier {
    pub fn parse(text: &str) -> Result<Self, SchemaError> {
        // Every declaration belongs to a library, so the `/` is required.
        let mut halves = text.split('/');
        let (library, decl) = match (halves.next(), halves.next(), halves.next()) {
            (Some(library), Some(decl), None) if !library.is_empty() => (library, decl),
            _ => return Err(SchemaError::InvalidCompoundIdentifier(text.to_string())),
        };

        let (name, member) = match decl.split_once('.') {
            Some((name, member)) => (name, Some(member.to_string())),
            None => (decl, None),
        };
        if name.is_empty() || member.as_deref() == Some("") {
            return Err(SchemaError::InvalidCompoundIdentifier(text.to_string()));
        }

        Ok(CompoundIdentifier {
            library: LibraryIdentifier::parse(library),
            name:    name.to_string(),
            member,
        })
    }
}

impl fmt::Display for CompoundIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.library, self.name)?;
        if let Some(member) = &self.member {
            write!(f, ".{}", member)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_library_and_name() {
        let ci = CompoundIdentifier::parse("fuchsia.ui.input/KeyboardEvent").unwrap();
        assert_eq!(ci.library.parts(), ["fuchsia", "ui", "input"]);
        assert_eq!(ci.name, "KeyboardEvent");
        assert_eq!(ci.member, None);
        assert_eq!(ci.to_string(), "fuchsia.ui.input/KeyboardEvent");
    }

    #[test]
    fn parses_member_reference() {
        let ci = CompoundIdentifier::parse("fidl.test/Color.RED").unwrap();
        assert_eq!(ci.name, "Color");
        assert_eq!(ci.member.as_deref(), Some("RED"));
    }

    #[test]
    fn rejects_malformed_identifiers() {
        assert!(CompoundIdentifier::parse("a/b/c").is_err());
        assert!(CompoundIdentifier::parse("fidl.test/").is_err());
        assert!(CompoundIdentifier::parse("fidl.test/Color.").is_err());
    }

    #[test]
    fn rejects_names_without_a_library() {
        for text in ["Name", "Color.RED", "/Name"] {
            match CompoundIdentifier::parse(text) {
                Err(SchemaError::InvalidCompoundIdentifier(bad)) => assert_eq!(bad, text),
                other => panic!("{} should not parse, got {:?}", text, other),
            }
        }
    }

    #[test]
    fn underscored_library_name() {
        assert_eq!(LibraryIdentifier::parse("fuchsia.io").underscored(), "fuchsia_io");
    }
}
