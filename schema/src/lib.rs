//! Typed view of the FIDL JSON intermediate representation, the input of the
//! Brine FIDL Dart backend. The IR is produced upstream by the FIDL frontend;
//! this crate only deserializes it and offers a few lookup helpers.
//!
//! ```
//! use brine_fidl_schema::*;
//!
//! let root = Root::from_json(r#"{
//!     "name": "fidl.test",
//!     "struct_declarations": [{
//!         "name": "fidl.test/Point",
//!         "size": 8,
//!         "members": [
//!             {"name": "x", "offset": 0, "type": {"kind": "primitive", "subtype": "float32"}},
//!             {"name": "y", "offset": 4, "type": {"kind": "primitive", "subtype": "float32"}}
//!         ]
//!     }],
//!     "declarations": {"fidl.test/Point": "struct"}
//! }"#).unwrap();
//!
//! assert_eq!(root.struct_declarations[0].members.len(), 2);
//! assert_eq!(root.decl_type("fidl.test/Point"), Some(DeclType::Struct));
//! ```

pub mod error;
pub mod identifier;
pub mod types;

pub use error::*;
pub use identifier::*;
pub use types::*;
