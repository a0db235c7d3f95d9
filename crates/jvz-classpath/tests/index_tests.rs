//! Tests for classpath index construction, precedence and lazy loading.
use crate::decl::DeclOrigin;
use crate::error::ConfigurationError;
use crate::index::{ClasspathConfig, ClasspathIndex, build_index};
use crate::test_support::*;
use jvz_common::{DiagnosticCategory, SourceEncoding};
use jvz_common::diagnostics::diagnostic_codes;

fn config(source_roots: Vec<std::path::PathBuf>, classpath: Vec<std::path::PathBuf>) -> ClasspathConfig {
    ClasspathConfig {
        source_roots,
        classpath,
        include_boot: false,
        ..ClasspathConfig::default()
    }
}

fn codes(index: &ClasspathIndex) -> Vec<u32> {
    index.diagnostics().iter().map(|d| d.code).collect()
}

#[test]
fn source_root_shadows_archive() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tree(
        &src,
        &[("p/A.java", b"package p;\npublic class A { public int fromSource; }\n")],
    );
    let jar = write_archive(
        &dir.path().join("lib.jar"),
        &[("p/A.class", &class_with_field("p/A", "fromArchive"))],
    );

    let index = build_index(&config(vec![src.clone()], vec![jar])).unwrap();
    assert!(matches!(
        index.lookup("p.A"),
        Some(DeclOrigin::Source { ref path }) if path.ends_with("p/A.java")
    ));
    let decl = index.type_decl("p.A").unwrap();
    assert_eq!(decl.fields.len(), 1);
    assert_eq!(decl.fields[0].name, "fromSource");

    let shadowed: Vec<_> = index
        .diagnostics()
        .iter()
        .filter(|d| d.code == diagnostic_codes::DUPLICATE_TYPE_IN_CLASSPATH)
        .collect();
    assert_eq!(shadowed.len(), 1);
    assert_eq!(shadowed[0].category, DiagnosticCategory::Info);
}

#[test]
fn source_roots_are_decoded_with_the_configured_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tree(
        &src,
        &[("p/Caf\u{e9}.java", b"package p;\npublic class Caf\xE9 { int n\xE4me; }\n")],
    );
    let latin1 = ClasspathConfig {
        encoding: SourceEncoding::Latin1,
        ..config(vec![src], Vec::new())
    };
    let index = build_index(&latin1).unwrap();
    let decl = index.type_decl("p.Caf\u{e9}").unwrap();
    assert_eq!(decl.fields[0].name, "n\u{e4}me");
}

#[test]
fn first_listed_archive_wins() {
    let dir = tempfile::tempdir().unwrap();
    let first = write_archive(
        &dir.path().join("first.jar"),
        &[("q/B.class", &class_with_field("q/B", "one"))],
    );
    let second = write_archive(
        &dir.path().join("second.jar"),
        &[("q/B.class", &class_with_field("q/B", "two"))],
    );

    let index = build_index(&config(Vec::new(), vec![first.clone(), second])).unwrap();
    match index.lookup("q.B") {
        Some(DeclOrigin::Archive { archive, entry }) => {
            assert_eq!(archive, first);
            assert_eq!(entry, "q/B.class");
        }
        other => panic!("unexpected origin {other:?}"),
    }
    let decl = index.type_decl("q.B").unwrap();
    assert_eq!(decl.fields[0].name, "one");
}

#[test]
fn missing_archive_is_a_diagnostic_not_a_failure() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tree(&src, &[("A.java", b"class A {}")]);
    let missing = dir.path().join("libs/missing.jar");

    let index = build_index(&config(vec![src], vec![missing])).unwrap();
    assert_eq!(codes(&index), vec![diagnostic_codes::CLASSPATH_ENTRY_NOT_FOUND]);
    assert!(index.diagnostics()[0].message_text.contains("missing.jar"));
    assert!(index.contains_type("A"));
}

#[test]
fn build_fails_when_no_entry_is_usable() {
    let dir = tempfile::tempdir().unwrap();
    let err = build_index(&config(
        vec![dir.path().join("no-src")],
        vec![dir.path().join("no.jar")],
    ))
    .unwrap_err();
    let ConfigurationError::NoUsableEntries { supplied, .. } = &err;
    assert_eq!(*supplied, 2);
    let codes: Vec<u32> = err.diagnostics().iter().map(|d| d.code).collect();
    assert_eq!(
        codes,
        vec![
            diagnostic_codes::SOURCE_ROOT_NOT_FOUND,
            diagnostic_codes::CLASSPATH_ENTRY_NOT_FOUND
        ]
    );
}

#[test]
fn corrupt_archive_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("bad.jar");
    std::fs::write(&bad, b"this is not a zip file").unwrap();
    let good = write_archive(
        &dir.path().join("good.jar"),
        &[("r/C.class", &class_with_field("r/C", "x"))],
    );

    let index = build_index(&config(Vec::new(), vec![bad, good])).unwrap();
    assert_eq!(codes(&index), vec![diagnostic_codes::CANNOT_READ_ARCHIVE]);
    assert!(index.diagnostics()[0].message_text.contains("bad.jar"));
    assert!(index.contains_type("r.C"));
}

#[test]
fn empty_configuration_is_not_an_error() {
    let index = build_index(&config(Vec::new(), Vec::new())).unwrap();
    assert!(index.is_empty());
    assert!(index.diagnostics().is_empty());
}

#[test]
fn class_directory_skips_anonymous_and_local_classes() {
    let dir = tempfile::tempdir().unwrap();
    let classes = dir.path().join("classes");
    write_tree(
        &classes,
        &[
            ("p/Outer.class", &class_with_field("p/Outer", "a")),
            ("p/Outer$Inner.class", &class_with_field("p/Outer$Inner", "b")),
            ("p/Outer$1.class", &class_with_field("p/Outer$1", "c")),
            ("p/Outer$1Local.class", &class_with_field("p/Outer$1Local", "d")),
            ("p/package-info.class", &class_with_field("p/package-info", "e")),
        ],
    );

    let index = build_index(&config(Vec::new(), vec![classes])).unwrap();
    assert_eq!(index.type_names(), vec!["p.Outer", "p.Outer.Inner"]);
    assert!(index.has_package("p"));
    assert!(!index.has_package("p.Outer"));
}

#[test]
fn archive_packages_include_prefixes() {
    let dir = tempfile::tempdir().unwrap();
    let jar = write_archive(
        &dir.path().join("lib.jar"),
        &[
            ("com/example/util/D.class", &class_with_field("com/example/util/D", "x")),
            ("META-INF/MANIFEST.MF", b"Manifest-Version: 1.0\n"),
        ],
    );
    let index = build_index(&config(Vec::new(), vec![jar])).unwrap();
    assert_eq!(index.len(), 1);
    for package in ["com", "com.example", "com.example.util"] {
        assert!(index.has_package(package), "{package}");
    }
    assert!(!index.has_package("example"));
}

#[test]
fn hidden_entries_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tree(
        &src,
        &[
            ("Visible.java", b"class Visible {}"),
            (".hidden/Secret.java", b"class Secret {}"),
            (".Dot.java", b"class Dot {}"),
        ],
    );
    let index = build_index(&config(vec![src], Vec::new())).unwrap();
    assert_eq!(index.type_names(), vec!["Visible"]);
}

#[test]
fn source_declarations_load_lazily_with_member_types() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tree(
        &src,
        &[
            (
                "p/Outer.java",
                b"package p;\nimport java.util.List;\npublic class Outer<T> {\n  List<T> items;\n  public static class Nested { Helper h; }\n}\n",
            ),
            ("p/Helper.java", b"package p;\nclass Helper {}\n"),
        ],
    );
    let mut cfg = config(vec![src], Vec::new());
    cfg.include_boot = true;
    let index = build_index(&cfg).unwrap();

    assert!(index.contains_type("p.Outer.Nested"));
    let outer = index.type_decl("p.Outer").unwrap();
    assert_eq!(outer.member_types, vec!["p.Outer.Nested".to_string()]);
    assert_eq!(outer.fields[0].ty.display_qualified(), "java.util.List<T>");

    let nested = index.type_decl("p.Outer.Nested").unwrap();
    assert_eq!(nested.enclosing.as_deref(), Some("p.Outer"));
    assert_eq!(nested.binary_name, "p.Outer$Nested");
    assert_eq!(nested.fields[0].ty.display_qualified(), "p.Helper");

    // Loading is cached: the same allocation comes back.
    let again = index.type_decl("p.Outer").unwrap();
    assert!(std::sync::Arc::ptr_eq(&outer, &again));
}

#[test]
fn archive_declarations_decode_on_demand() {
    let dir = tempfile::tempdir().unwrap();
    let jar = write_archive(
        &dir.path().join("lib.jar"),
        &[
            ("s/E.class", &class_with_field("s/E", "value")),
            ("s/Broken.class", b"\xCA\xFE\xBA\xBE\x00"),
        ],
    );
    let index = build_index(&config(Vec::new(), vec![jar])).unwrap();
    let decl = index.type_decl("s.E").unwrap();
    assert!(matches!(decl.origin, DeclOrigin::Archive { .. }));
    assert_eq!(decl.constructors().count(), 1);

    // Indexed by name, but the body cannot be decoded.
    assert!(index.contains_type("s.Broken"));
    assert!(index.type_decl("s.Broken").is_none());
    assert!(index.type_decl("s.Missing").is_none());
}

#[test]
fn sources_shadow_the_boot_library_silently() {
    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    write_tree(
        &src,
        &[("java/util/ArrayList.java", b"package java.util;\npublic class ArrayList {}\n")],
    );
    let mut cfg = config(vec![src], Vec::new());
    cfg.include_boot = true;
    let index = build_index(&cfg).unwrap();

    assert!(matches!(index.lookup("java.util.ArrayList"), Some(DeclOrigin::Source { .. })));
    assert!(matches!(index.lookup("java.util.HashMap"), Some(DeclOrigin::Boot { .. })));
    assert!(index.diagnostics().is_empty());
}

#[test]
fn index_is_shareable_across_threads() {
    let index = ClasspathIndex::boot_only();
    let names = ["java.lang.String", "java.util.List", "java.io.File", "java.util.Map.Entry"];
    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                for name in names {
                    assert!(index.type_decl(name).is_some(), "{name}");
                }
            });
        }
    });
    let a = index.type_decl("java.lang.String").unwrap();
    let b = index.type_decl("java.lang.String").unwrap();
    assert!(std::sync::Arc::ptr_eq(&a, &b));
}
