use crate::{
    error::Result,
    model,
    resolver::library_package,
    verifier::verify_root,
};
use brine_fidl_schema::{LibraryIdentifier, Root};
use std::cell::RefCell;

/// Compilation state for one library. Declarations compile independently;
/// the only thing shared between them is the set of foreign libraries they
/// reference.
pub struct Compiler<'a> {
    pub(crate) root:       &'a Root,
    pub(crate) library:    LibraryIdentifier,
    pub(crate) referenced: RefCell<Vec<LibraryIdentifier>>,
}

impl<'a> Compiler<'a> {
    pub fn new(root: &'a Root) -> Self {
        Compiler {
            root,
            library: LibraryIdentifier::parse(&root.name),
            referenced: RefCell::new(Vec::new()),
        }
    }
}

/// Verify `root` and compile it into the generation model.
/// Returns `Err(FidlgenError)` on the first inconsistent declaration.
#[tracing::instrument(skip_all, fields(library = %root.name))]
pub fn compile(root: &Root) -> Result<model::Root> {
    verify_root(root)?;
    let c = Compiler::new(root);

    let consts = compile_all("const", &root.const_declarations, |d| c.compile_const(d))?;
    let enums = compile_all("enum", &root.enum_declarations, |d| c.compile_enum(d))?;
    let bits = compile_all("bits", &root.bits_declarations, |d| c.compile_bits(d))?;
    let interfaces = compile_all("interface", &root.interface_declarations, |d| c.compile_interface(d))?;
    let structs = compile_all("struct", &root.struct_declarations, |d| c.compile_struct(d))?;
    let tables = compile_all("table", &root.table_declarations, |d| c.compile_table(d))?;
    let unions = compile_all("union", &root.union_declarations, |d| c.compile_union(d))?;
    let xunions = compile_all("xunion", &root.xunion_declarations, |d| c.compile_xunion(d))?;

    Ok(model::Root {
        library_name: library_package(&c.library),
        imports: c.imports(),
        consts,
        enums,
        bits,
        interfaces,
        structs,
        tables,
        unions,
        xunions,
    })
}

fn compile_all<T, U>(kind: &str, decls: &[T], f: impl Fn(&T) -> Result<U>) -> Result<Vec<U>> {
    if !decls.is_empty() {
        tracing::debug!(kind, count = decls.len(), "compiling declarations");
    }
    decls.iter().map(f).collect()
}
