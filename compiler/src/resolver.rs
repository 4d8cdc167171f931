//! Same-library vs. foreign-library references.
//!
//! A reference into another library is prefixed with that library's import
//! alias (`lib$fuchsia_io.File`), and the library is remembered so the
//! generated files import it exactly once.

use crate::{
    compiler::Compiler,
    model::Import,
    names::{legalize_lower, legalize_upper, Context},
};
use brine_fidl_schema::{CompoundIdentifier, LibraryIdentifier};

/// Dart package name of a library's bindings, `fidl_<parts>`.
pub fn library_package(library: &LibraryIdentifier) -> String {
    format!("fidl_{}", library.underscored())
}

/// Import alias of a library, `lib$<parts>`.
pub fn library_prefix(library: &LibraryIdentifier) -> String {
    format!("lib${}", library.underscored())
}

impl<'a> Compiler<'a> {
    pub fn in_external_library(&self, ci: &CompoundIdentifier) -> bool {
        let theirs = ci.library.parts();
        let ours = self.library.parts();
        theirs.len() != ours.len() || theirs.iter().zip(ours).any(|(a, b)| a != b)
    }

    /// Records a reference to `ci` and reports whether it is external.
    pub(crate) fn resolve(&self, ci: &CompoundIdentifier) -> bool {
        if !self.in_external_library(ci) {
            return false;
        }
        let mut referenced = self.referenced.borrow_mut();
        if !referenced.contains(&ci.library) {
            tracing::debug!(library = %ci.library, "new external library reference");
            referenced.push(ci.library.clone());
        }
        true
    }

    pub fn type_symbol(&self, ci: &CompoundIdentifier) -> String {
        self.symbol_with_suffix(ci, "Type")
    }

    pub fn opt_type_symbol(&self, ci: &CompoundIdentifier) -> String {
        self.symbol_with_suffix(ci, "OptType")
    }

    fn symbol_with_suffix(&self, ci: &CompoundIdentifier, suffix: &str) -> String {
        let symbol = format!("k{}_{}", ci.name, suffix);
        if self.resolve(ci) {
            format!("{}.{}", library_prefix(&ci.library), symbol)
        } else {
            symbol
        }
    }

    /// `name` (already cased) qualified with the library alias when external.
    fn qualify(&self, ci: &CompoundIdentifier, name: &str, ctx: Context) -> String {
        let name = ctx.change_if_reserved(name);
        if self.resolve(ci) {
            format!("{}.{}", library_prefix(&ci.library), name)
        } else {
            name
        }
    }

    pub fn compile_upper_camel_compound_identifier(
        &self,
        ci: &CompoundIdentifier,
        ext: &str,
        ctx: Context,
    ) -> String {
        let name = legalize_upper(&ci.name, ctx) + ext;
        self.qualify(ci, &name, ctx)
    }

    pub fn compile_lower_camel_compound_identifier(
        &self,
        ci: &CompoundIdentifier,
        ext: &str,
        ctx: Context,
    ) -> String {
        let name = legalize_lower(&ci.name, ctx) + ext;
        self.qualify(ci, &name, ctx)
    }

    /// One import per external library referenced so far, in first-seen order.
    pub fn imports(&self) -> Vec<Import> {
        let referenced = self.referenced.borrow();
        for dep in &self.root.library_dependencies {
            let library = LibraryIdentifier::parse(&dep.name);
            if library != self.library && !referenced.contains(&library) {
                tracing::debug!(library = %library, "dependency is never referenced, not importing it");
            }
        }
        referenced
            .iter()
            .map(|library| {
                let package = library_package(library);
                Import {
                    url:        format!("package:{}/fidl.dart", package),
                    local_name: library_prefix(library),
                    async_url:  format!("package:{}/fidl_async.dart", package),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brine_fidl_schema::Root;

    fn root() -> Root {
        Root::from_json(r#"{"name": "fuchsia.ui.gfx"}"#).unwrap()
    }

    fn ci(text: &str) -> CompoundIdentifier {
        CompoundIdentifier::parse(text).unwrap()
    }

    #[test]
    fn external_library_is_component_wise() {
        let root = root();
        let c = Compiler::new(&root);
        assert!(!c.in_external_library(&ci("fuchsia.ui.gfx/Node")));
        assert!(c.in_external_library(&ci("fuchsia.ui/Node")));
        assert!(c.in_external_library(&ci("fuchsia.ui.gfx.extra/Node")));
        assert!(c.in_external_library(&ci("fuchsia.ux.gfx/Node")));
    }

    #[test]
    fn qualified_names_only_for_external_references() {
        let root = root();
        let c = Compiler::new(&root);
        assert_eq!(
            c.compile_upper_camel_compound_identifier(&ci("fuchsia.ui.gfx/node_args"), "", Context::Declaration),
            "NodeArgs"
        );
        assert_eq!(
            c.compile_upper_camel_compound_identifier(&ci("fuchsia.mem/Buffer"), "", Context::Declaration),
            "lib$fuchsia_mem.Buffer"
        );
        assert_eq!(c.type_symbol(&ci("fuchsia.mem/Buffer")), "lib$fuchsia_mem.kBuffer_Type");
        assert_eq!(c.opt_type_symbol(&ci("fuchsia.ui.gfx/Value")), "kValue_OptType");
    }

    #[test]
    fn imports_are_deduplicated_in_first_seen_order() {
        let root = root();
        let c = Compiler::new(&root);
        c.type_symbol(&ci("fuchsia.mem/Buffer"));
        c.type_symbol(&ci("fuchsia.images/Image"));
        c.type_symbol(&ci("fuchsia.mem/Range"));
        c.type_symbol(&ci("fuchsia.ui.gfx/Node"));

        let imports = c.imports();
        assert_eq!(imports.len(), 2);
        assert_eq!(imports[0].local_name, "lib$fuchsia_mem");
        assert_eq!(imports[0].url, "package:fidl_fuchsia_mem/fidl.dart");
        assert_eq!(imports[0].async_url, "package:fidl_fuchsia_mem/fidl_async.dart");
        assert_eq!(imports[1].local_name, "lib$fuchsia_images");
    }
}
