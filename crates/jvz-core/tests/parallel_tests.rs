use std::path::PathBuf;

use jvz_classpath::{ClasspathConfig, ClasspathIndex, build_index};
use jvz_common::diagnostic_codes;

use super::*;

fn text(name: &str, source: &str) -> SourceInput {
    SourceInput::Text {
        name: name.to_string(),
        text: source.to_string(),
    }
}

fn codes(result: &CompilationResult) -> Vec<u32> {
    result.diagnostics.iter().map(|d| d.code).collect()
}

fn mixed_batch() -> Vec<SourceInput> {
    let mut inputs = vec![
        text(
            "shapes/Shape.java",
            "package shapes; public abstract class Shape { public abstract double area(); }",
        ),
        text(
            "shapes/Circle.java",
            "package shapes; public class Circle extends Shape { double r; public double area() { return Math.PI * r * r; } }",
        ),
        text(
            "app/Main.java",
            "package app; import shapes.*; import java.util.List; class Main { void m(Shape s) { double a = s.area(); Missing x; } }",
        ),
        text("app/Broken.java", "package app; class Broken { void m() { int x = ; return 1; } }"),
    ];
    for i in 0..20 {
        inputs.push(text(
            &format!("gen/G{i}.java"),
            &format!("package gen; class G{i} {{ int f{i}(int x) {{ return x * {i} + undefined{i}; }} }}"),
        ));
    }
    inputs
}

#[test]
fn test_parse_single_file() {
    let results = parse_files_parallel(vec![("A.java".to_string(), "class A {}".to_string())]);
    assert_eq!(results.len(), 1);
    assert!(results[0].root.is_some());
    assert!(results[0].diagnostics.is_empty());
}

#[test]
fn test_parse_with_stats() {
    let files = vec![
        ("A.java".to_string(), "class A { int f() { return 1; } }".to_string()),
        ("B.java".to_string(), "class B { void g( }".to_string()),
    ];
    let (results, stats) = parse_files_with_stats(files);
    assert_eq!(results.len(), 2);
    assert_eq!(stats.file_count, 2);
    assert!(stats.total_bytes > 0);
    assert!(stats.total_nodes > 0);
    assert!(stats.error_count >= 1);
}

#[test]
fn test_siblings_resolve_each_other() {
    let index = ClasspathIndex::boot_only();
    let inputs = vec![
        text("a/A.java", "package a; import b.B; public class A { int n(B b) { return b.count(); } }"),
        text("b/B.java", "package b; public class B { public int count() { return 0; } }"),
    ];
    let batch = run(&inputs, &index, &BatchOptions::default()).unwrap();
    assert_eq!(batch.summary.files, 2);
    assert_eq!(batch.summary.errors, 0, "{:?}", batch.diagnostics().collect::<Vec<_>>());
    let keys: Vec<&str> = batch.files.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["a/A.java", "b/B.java"]);
    assert!(batch.files["a/A.java"].bindings.is_some());
}

#[test]
fn test_parallel_matches_sequential() {
    let index = ClasspathIndex::boot_only();
    let inputs = mixed_batch();
    let parallel = run(
        &inputs,
        &index,
        &BatchOptions {
            jobs: Some(4),
            ..BatchOptions::default()
        },
    )
    .unwrap();
    let sequential = run(
        &inputs,
        &index,
        &BatchOptions {
            sequential: true,
            ..BatchOptions::default()
        },
    )
    .unwrap();

    assert_eq!(parallel.files.len(), sequential.files.len());
    for ((name_a, a), (name_b, b)) in parallel.files.iter().zip(&sequential.files) {
        assert_eq!(name_a, name_b);
        assert_eq!(a.diagnostics, b.diagnostics, "{name_a}");
        assert_eq!(a.bindings, b.bindings, "{name_a}");
    }
    assert_eq!(parallel.summary.errors, sequential.summary.errors);
}

#[test]
fn test_diagnostics_are_merged_in_offset_order() {
    let index = ClasspathIndex::boot_only();
    let batch = run(&mixed_batch(), &index, &BatchOptions::default()).unwrap();

    let main = &batch.files["app/Main.java"];
    assert_eq!(
        codes(main),
        vec![diagnostic_codes::UNUSED_IMPORT, diagnostic_codes::CANNOT_FIND_SYMBOL]
    );

    let broken = &batch.files["app/Broken.java"];
    assert!(broken.diagnostics.windows(2).all(|w| w[0].start <= w[1].start));
    assert!(broken.diagnostics.iter().all(|d| d.range.is_some()));
    assert!(codes(broken).contains(&diagnostic_codes::UNEXPECTED_RETURN_VALUE));
}

#[test]
fn test_syntax_only_run_skips_binding() {
    let index = ClasspathIndex::empty();
    let options = BatchOptions {
        resolve_bindings: false,
        ..BatchOptions::default()
    };
    let batch = run(&mixed_batch(), &index, &options).unwrap();
    for result in batch.files.values() {
        assert!(result.bindings.is_none());
        assert!(result.diagnostics.iter().all(|d| d.code < 3000), "{:?}", result.diagnostics);
    }
    assert_eq!(batch.summary.files_with_errors, 1);
}

#[test]
fn test_repeated_input_is_counted_once() {
    let index = ClasspathIndex::boot_only();
    let broken = text("A.java", "class A { void m() { int x = ; } }");
    let batch = run(&[broken.clone(), broken], &index, &BatchOptions::default()).unwrap();
    assert_eq!(batch.files.len(), 1);
    assert_eq!(codes(&batch.files["A.java"]), vec![diagnostic_codes::ILLEGAL_START_OF_EXPRESSION]);
    assert_eq!(batch.summary.files, 1);
    assert_eq!(batch.summary.errors, 1);
    assert_eq!(batch.diagnostics().count(), 1);
}

#[test]
fn test_type_declared_in_two_files_is_a_duplicate_class() {
    let index = ClasspathIndex::boot_only();
    let inputs = vec![
        text("one/A.java", "package p; class A { }"),
        text("two/A.java", "package p; class A { }"),
    ];
    let batch = run(&inputs, &index, &BatchOptions::default()).unwrap();
    assert!(batch.files["one/A.java"].diagnostics.is_empty());
    assert_eq!(codes(&batch.files["two/A.java"]), vec![diagnostic_codes::DUPLICATE_CLASS]);
    assert_eq!(batch.summary.errors, 1);
}

#[test]
fn test_unreadable_file_is_a_diagnostic() {
    let index = ClasspathIndex::boot_only();
    let missing = PathBuf::from("definitely/not/here/A.java");
    let batch = run_paths(&[missing.clone()], &index, &BatchOptions::default()).unwrap();
    let result = &batch.files[&missing.display().to_string()];
    assert_eq!(codes(result), vec![diagnostic_codes::CANNOT_READ_FILE]);
    assert_eq!(batch.summary.errors, 1);
}

#[test]
fn test_files_are_decoded_with_the_configured_encoding() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("A.java");
    std::fs::write(&path, b"class A { String s = \"caf\xE9\"; }").unwrap();
    let index = ClasspathIndex::boot_only();

    let latin1 = BatchOptions {
        encoding: SourceEncoding::Latin1,
        ..BatchOptions::default()
    };
    let batch = run_paths(&[path.clone()], &index, &latin1).unwrap();
    let result = batch.files.values().next().unwrap();
    assert!(result.diagnostics.is_empty(), "{:?}", result.diagnostics);
    assert!(result.text.contains("caf\u{e9}"));

    let batch = run_paths(&[path], &index, &BatchOptions::default()).unwrap();
    let result = batch.files.values().next().unwrap();
    assert_eq!(codes(result), vec![diagnostic_codes::INVALID_ENCODING]);
    assert_eq!(batch.summary.errors, 0);
    assert_eq!(batch.summary.warnings, 1);
}

#[test]
fn test_missing_archive_is_reported_and_the_run_completes() {
    let dir = tempfile::tempdir().unwrap();
    let classes = dir.path().join("classes");
    std::fs::create_dir(&classes).unwrap();
    let config = ClasspathConfig {
        source_roots: Vec::new(),
        classpath: vec![dir.path().join("libs/missing.jar"), classes],
        include_boot: true,
        ..ClasspathConfig::default()
    };
    let index = build_index(&config).unwrap();
    let inputs = vec![text("A.java", "class A { String s; }")];
    let batch = run(&inputs, &index, &BatchOptions::default()).unwrap();
    assert_eq!(batch.configuration.len(), 1);
    assert_eq!(batch.configuration[0].code, diagnostic_codes::CLASSPATH_ENTRY_NOT_FOUND);
    assert!(batch.files["A.java"].diagnostics.is_empty());
    assert_eq!(batch.summary.errors, 1);
}

#[test]
fn test_source_roots_shadow_archives_for_bound_references() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().join("src");
    std::fs::create_dir_all(root.join("lib")).unwrap();
    std::fs::write(
        root.join("lib/Util.java"),
        "package lib; public class Util { public static int twice(int x) { return 2 * x; } }",
    )
    .unwrap();
    let config = ClasspathConfig {
        source_roots: vec![root],
        classpath: Vec::new(),
        include_boot: true,
        ..ClasspathConfig::default()
    };
    let index = build_index(&config).unwrap();
    let inputs = vec![text(
        "app/Main.java",
        "package app; import lib.Util; class Main { int m() { return Util.twice(2); } }",
    )];
    let batch = run(&inputs, &index, &BatchOptions::default()).unwrap();
    assert!(
        batch.files["app/Main.java"].diagnostics.is_empty(),
        "{:?}",
        batch.files["app/Main.java"].diagnostics
    );
}
