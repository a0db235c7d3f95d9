//! Tests for the embedded boot library.
use crate::boot::{BOOT_SOURCES, boot_source, total_boot_size};
use crate::decl::{DeclOrigin, TypeRef};
use crate::index::ClasspathIndex;
use crate::source_scan::scan_header;

fn contains_unknown(ty: &TypeRef) -> bool {
    match ty {
        TypeRef::Unknown(_) => true,
        TypeRef::Class { args, .. } => args.iter().any(contains_unknown),
        TypeRef::Array(element) => contains_unknown(element),
        TypeRef::Wildcard { bound, .. } => bound.as_deref().is_some_and(contains_unknown),
        _ => false,
    }
}

#[test]
fn boot_sources_parse_cleanly() {
    for source in BOOT_SOURCES {
        let parsed = jvz_parser::parse(source.file_name, source.content);
        assert!(
            parsed.diagnostics.is_empty(),
            "{}: {:?}",
            source.file_name,
            parsed.diagnostics
        );
        assert_eq!(scan_header(source.content).package, source.package);
    }
    assert!(boot_source("java.util").is_some());
    assert!(boot_source("javax.swing").is_none());
    assert!(total_boot_size() > 0);
}

#[test]
fn boot_signatures_resolve_completely() {
    let index = ClasspathIndex::boot_only();
    for name in index.type_names() {
        let decl = index
            .type_decl(name)
            .unwrap_or_else(|| panic!("{name} did not load"));
        assert!(decl.origin.is_boot());
        let supertypes = decl.supertypes();
        let mut types: Vec<&TypeRef> = supertypes.iter().collect();
        for field in &decl.fields {
            types.push(&field.ty);
        }
        for method in &decl.methods {
            types.extend(method.parameters.iter());
            types.push(&method.return_type);
            types.extend(method.throws.iter());
        }
        for param in decl.type_parameters.iter() {
            types.extend(param.bounds.iter());
        }
        for ty in types {
            assert!(!contains_unknown(ty), "{name}: unresolved {}", ty.display_qualified());
        }
    }
}

#[test]
fn boot_core_types() {
    let index = ClasspathIndex::boot_only();
    for name in [
        "java.lang.Object",
        "java.lang.String",
        "java.lang.Integer",
        "java.lang.Iterable",
        "java.lang.annotation.Retention",
        "java.io.PrintStream",
        "java.util.ArrayList",
        "java.util.Map.Entry",
    ] {
        assert!(index.contains_type(name), "{name}");
    }
    assert!(index.has_package("java"));
    assert!(index.has_package("java.lang.annotation"));
    assert!(matches!(
        index.lookup("java.lang.String"),
        Some(DeclOrigin::Boot { ref file_name }) if file_name == "java/lang/package.java"
    ));

    let object = index.type_decl("java.lang.Object").unwrap();
    assert!(object.superclass.is_none());
    assert!(object.supertypes().is_empty());

    let list = index.type_decl("java.util.ArrayList").unwrap();
    assert_eq!(list.superclass.as_ref().unwrap().display_simple(), "AbstractList<E>");
    assert_eq!(list.constructors().count(), 3);

    let entry = index.type_decl("java.util.Map.Entry").unwrap();
    assert_eq!(entry.enclosing.as_deref(), Some("java.util.Map"));
    assert!(entry.is_static());

    let out = index.type_decl("java.lang.System").unwrap();
    let (_, field) = out.fields_named("out").next().unwrap();
    assert_eq!(field.ty, TypeRef::class("java.io.PrintStream"));
}
