//! Classpath index for the jvz Java front end.
//!
//! - `index::build_index` - name-only index of source roots, class
//!   directories, archives and the embedded boot library
//! - `decl` - `TypeDecl`/`FieldDecl`/`MethodDecl` and the `TypeRef` model
//! - `source_decls` - declarations from parsed compilation units, shared
//!   with the binder for sibling units of a batch
//! - `class_file` / `signature` - class file and generic signature decoding

pub mod boot;
pub mod class_file;
pub mod decl;
pub mod error;
pub mod index;
pub mod signature;
pub mod source_decls;
pub mod source_scan;

pub use decl::{
    DeclOrigin, FieldDecl, JAVA_LANG_OBJECT, JAVA_LANG_STRING, MethodDecl, TypeDecl, TypeParam,
    TypeRef,
};
pub use error::{ClassFileError, ConfigurationError};
pub use index::{ClasspathConfig, ClasspathIndex, build_index};
pub use source_decls::{
    ImportContext, TypeConverter, anonymous_type_decl, declared_type_names,
    extract_local_type_decls, extract_type_decls,
};

#[cfg(test)]
#[path = "../tests/test_support.rs"]
mod test_support;
#[cfg(test)]
#[path = "../tests/index_tests.rs"]
mod index_tests;
#[cfg(test)]
#[path = "../tests/class_file_tests.rs"]
mod class_file_tests;
#[cfg(test)]
#[path = "../tests/source_decls_tests.rs"]
mod source_decls_tests;
#[cfg(test)]
#[path = "../tests/boot_tests.rs"]
mod boot_tests;
