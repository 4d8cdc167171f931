//! brine-fidl
//!
//! Generator facade over the compiler: load a FIDL JSON IR file, compile it,
//! render the three Dart binding files, pass each through `dartfmt` when one
//! is configured, and write them under an output directory.
//!
//! - `generate_bindings` / `generate_from_json` drive a full run
//! - `inspect_to_json` dumps the compiled generation model
//! - schema, model and error types are re-exported

use brine_fidl_compiler::{compile, BindingFile, Formatter};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

pub use brine_fidl_compiler::error::{FidlgenError, Result};
pub use brine_fidl_compiler::{model, FORMATTER_TIMEOUT};
pub use brine_fidl_schema::{Root, SchemaError};

/// Where and how the bindings are written.
#[derive(Debug, Clone, Default)]
pub struct GeneratorConfig {
    /// Directory receiving `fidl.dart`, `fidl_async.dart` and `fidl_test.dart`.
    pub output_base: PathBuf,
    /// Optional path to a `dartfmt` executable.
    pub dartfmt:     Option<PathBuf>,
}

impl GeneratorConfig {
    fn formatter(&self) -> Formatter {
        Formatter::new(self.dartfmt.clone())
    }
}

/// Compile `root` and write every binding file under `config.output_base`.
/// A file is written only once its formatter pass has succeeded.
#[tracing::instrument(skip_all, fields(library = %root.name))]
pub fn generate_bindings(root: &Root, config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    let model = compile(root)?;
    fs::create_dir_all(&config.output_base)?;

    let formatter = config.formatter();
    let mut written = Vec::with_capacity(BindingFile::ALL.len());
    for file in BindingFile::ALL {
        let source = file.render(&model);

        let mut pipe = formatter.pipe(Vec::with_capacity(source.len()))?;
        pipe.write_all(source.as_bytes())?;
        let formatted = pipe.close()?;

        let path = config.output_base.join(file.file_name());
        fs::write(&path, &formatted)?;
        tracing::info!(path = %path.display(), bytes = formatted.len(), "wrote bindings");
        written.push(path);
    }
    Ok(written)
}

/// Load a JSON IR file and generate its bindings.
pub fn generate_from_json(json: &Path, config: &GeneratorConfig) -> Result<Vec<PathBuf>> {
    let root = Root::load(json)?;
    generate_bindings(&root, config)
}

/// Compile a JSON IR file and return the generation model as pretty JSON.
pub fn inspect_to_json(json: &Path) -> Result<String> {
    let root = Root::load(json)?;
    let model = compile(&root)?;
    serde_json::to_string_pretty(&model).map_err(|e| FidlgenError::Schema(SchemaError::Json(e)))
}

pub mod schema {
    pub use brine_fidl_schema::*;
}

pub mod error {
    pub use brine_fidl_compiler::error::FidlgenError;
    pub use brine_fidl_schema::SchemaError;
}
