//! Embedded boot library.
//!
//! Source stubs for the core of `java.lang`, `java.io` and `java.util` are
//! compiled into the binary with `include_str!` so binding works without a
//! JDK installation. They are indexed as the last classpath entry, so any
//! real archive or source root that declares the same type shadows them.
//!
//! Stubs declare signatures only: method bodies are absent (`native`) or
//! trivial, and several public types share one file.

/// One embedded stub file.
#[derive(Debug, Clone, Copy)]
pub struct BootSource {
    /// Package declared by the file.
    pub package: &'static str,
    /// Name used in diagnostics and declaration origins.
    pub file_name: &'static str,
    pub content: &'static str,
}

pub const BOOT_JAVA_LANG: BootSource = BootSource {
    package: "java.lang",
    file_name: "java/lang/package.java",
    content: include_str!("../boot/java_lang.java"),
};

pub const BOOT_JAVA_LANG_ANNOTATION: BootSource = BootSource {
    package: "java.lang.annotation",
    file_name: "java/lang/annotation/package.java",
    content: include_str!("../boot/java_lang_annotation.java"),
};

pub const BOOT_JAVA_IO: BootSource = BootSource {
    package: "java.io",
    file_name: "java/io/package.java",
    content: include_str!("../boot/java_io.java"),
};

pub const BOOT_JAVA_UTIL: BootSource = BootSource {
    package: "java.util",
    file_name: "java/util/package.java",
    content: include_str!("../boot/java_util.java"),
};

/// All boot sources, in indexing order.
pub const BOOT_SOURCES: &[BootSource] = &[
    BOOT_JAVA_LANG,
    BOOT_JAVA_LANG_ANNOTATION,
    BOOT_JAVA_IO,
    BOOT_JAVA_UTIL,
];

/// Look up a boot source by its package name.
#[must_use]
pub fn boot_source(package: &str) -> Option<&'static BootSource> {
    BOOT_SOURCES.iter().find(|s| s.package == package)
}

/// Total size of the embedded stubs in bytes.
#[must_use]
pub fn total_boot_size() -> usize {
    BOOT_SOURCES.iter().map(|s| s.content.len()).sum()
}
