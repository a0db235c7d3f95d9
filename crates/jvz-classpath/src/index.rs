//! The classpath index: fully-qualified type name to declaration origin.
//!
//! Construction walks every configured entry once and records only names.
//! Member detail is produced on first request and cached in a write-once
//! cell per entry, so concurrent readers always observe the same result and
//! the name map never changes after `build_index` returns.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use jvz_common::diagnostics::diagnostic_codes;
use jvz_common::limits::MAX_CLASS_FILE_BYTES;
use jvz_common::source_text::{SourceEncoding, read_source};
use jvz_common::Diagnostic;
use once_cell::sync::OnceCell;
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::{debug, info_span, trace, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::boot::BOOT_SOURCES;
use crate::class_file::read_class_file;
use crate::decl::{DeclOrigin, TypeDecl, canonical_from_binary};
use crate::error::{ClassFileError, ConfigurationError};
use crate::source_decls::extract_type_decls;
use crate::source_scan::scan_header;

/// Which locations make up the classpath.
#[derive(Clone, Debug)]
pub struct ClasspathConfig {
    /// Directories of `.java` files. They shadow every other entry.
    pub source_roots: Vec<PathBuf>,
    /// Class directories and `.jar`/`.zip` archives, searched in order.
    pub classpath: Vec<PathBuf>,
    /// Index the embedded boot library after everything else.
    pub include_boot: bool,
    /// Encoding of source root files without a byte order mark.
    pub encoding: SourceEncoding,
}

impl Default for ClasspathConfig {
    fn default() -> Self {
        ClasspathConfig {
            source_roots: Vec::new(),
            classpath: Vec::new(),
            include_boot: true,
            encoding: SourceEncoding::Utf8,
        }
    }
}

impl ClasspathConfig {
    #[must_use]
    pub fn entries_supplied(&self) -> usize {
        self.source_roots.len() + self.classpath.len()
    }
}

enum SourceText {
    File(PathBuf),
    Embedded(&'static str),
}

/// A `.java` file (or boot stub) that declares indexed types.
struct SourceUnit {
    origin: DeclOrigin,
    text: SourceText,
    decls: OnceCell<Vec<Arc<TypeDecl>>>,
}

struct ArchiveHandle {
    path: PathBuf,
    reader: Mutex<ZipArchive<BufReader<File>>>,
}

#[derive(Debug)]
enum Location {
    Source { unit: usize },
    ClassFile { path: PathBuf },
    Archive { archive: usize, entry: String },
}

struct IndexEntry {
    location: Location,
    decl: OnceCell<Option<Arc<TypeDecl>>>,
}

/// Frozen map from canonical type names to declarations.
pub struct ClasspathIndex {
    types: FxHashMap<String, IndexEntry>,
    packages: FxHashSet<String>,
    source_units: Vec<SourceUnit>,
    archives: Vec<ArchiveHandle>,
    diagnostics: Vec<Diagnostic>,
    encoding: SourceEncoding,
}

impl std::fmt::Debug for ClasspathIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClasspathIndex")
            .field("types", &self.types.len())
            .field("packages", &self.packages.len())
            .field("source_units", &self.source_units.len())
            .field("archives", &self.archives.len())
            .field("diagnostics", &self.diagnostics.len())
            .field("encoding", &self.encoding)
            .finish()
    }
}

/// Build the index for `config`.
///
/// Unusable entries are recorded as diagnostics on the index. The build
/// fails only when entries were supplied and none of them could be used.
pub fn build_index(config: &ClasspathConfig) -> Result<ClasspathIndex, ConfigurationError> {
    let _span = info_span!(
        "build_index",
        source_roots = config.source_roots.len(),
        classpath = config.classpath.len()
    )
    .entered();

    let mut builder = IndexBuilder::default();
    builder.index.encoding = config.encoding;
    let mut usable = 0usize;

    for root in &config.source_roots {
        if builder.add_source_root(root) {
            usable += 1;
        }
    }
    for entry in &config.classpath {
        let added = if entry.is_dir() {
            builder.add_class_directory(entry)
        } else if entry.is_file() {
            builder.add_archive(entry)
        } else {
            builder.report(
                entry,
                diagnostic_codes::CLASSPATH_ENTRY_NOT_FOUND,
                &[&entry.display().to_string()],
            );
            false
        };
        if added {
            usable += 1;
        }
    }

    let supplied = config.entries_supplied();
    if supplied > 0 && usable == 0 {
        return Err(ConfigurationError::NoUsableEntries {
            supplied,
            diagnostics: builder.index.diagnostics,
        });
    }

    if config.include_boot {
        builder.add_boot();
    }

    let index = builder.index;
    debug!(
        types = index.types.len(),
        packages = index.packages.len(),
        usable,
        supplied,
        "classpath index built"
    );
    Ok(index)
}

struct IndexBuilder {
    index: ClasspathIndex,
}

impl Default for IndexBuilder {
    fn default() -> Self {
        IndexBuilder {
            index: ClasspathIndex {
                types: FxHashMap::default(),
                packages: FxHashSet::default(),
                source_units: Vec::new(),
                archives: Vec::new(),
                diagnostics: Vec::new(),
                encoding: SourceEncoding::default(),
            },
        }
    }
}

impl IndexBuilder {
    fn report(&mut self, path: &Path, code: u32, args: &[&str]) {
        let diag = Diagnostic::from_code(&path.display().to_string(), 0, 0, code, args);
        warn!(code, message = %diag.message_text, "classpath entry skipped");
        self.index.diagnostics.push(diag);
    }

    /// Register `name`; an earlier entry with the same name wins.
    fn insert(&mut self, name: String, package: &str, location: Location) {
        if let Some(existing) = self.index.types.get(&name) {
            let shadowed = self.index.origin_of(&location);
            if !shadowed.is_boot() {
                let winner = self.index.origin_of(&existing.location);
                trace!(name = %name, %winner, %shadowed, "type shadowed");
                self.index.diagnostics.push(Diagnostic::from_code(
                    &shadowed.to_string(),
                    0,
                    0,
                    diagnostic_codes::DUPLICATE_TYPE_IN_CLASSPATH,
                    &[&name, &shadowed.to_string()],
                ));
            }
            return;
        }
        self.add_package(package);
        self.index.types.insert(
            name,
            IndexEntry {
                location,
                decl: OnceCell::new(),
            },
        );
    }

    fn add_package(&mut self, package: &str) {
        let mut end = package.len();
        while end > 0 {
            let prefix = &package[..end];
            if !self.index.packages.insert(prefix.to_string()) {
                break;
            }
            end = prefix.rfind('.').unwrap_or(0);
        }
    }

    fn add_source_unit(&mut self, origin: DeclOrigin, text: SourceText, content: &str) {
        let header = scan_header(content);
        let unit = self.index.source_units.len();
        self.index.source_units.push(SourceUnit {
            origin,
            text,
            decls: OnceCell::new(),
        });
        for relative in header.types {
            let name = if header.package.is_empty() {
                relative
            } else {
                format!("{}.{relative}", header.package)
            };
            self.insert(name, &header.package, Location::Source { unit });
        }
    }

    fn add_source_root(&mut self, root: &Path) -> bool {
        if !root.is_dir() {
            self.report(
                root,
                diagnostic_codes::SOURCE_ROOT_NOT_FOUND,
                &[&root.display().to_string()],
            );
            return false;
        }
        let _span = info_span!("source_root", root = %root.display()).entered();
        let mut files = 0usize;
        for path in walk_files(root, "java") {
            if let Some(content) = self.index.read_source_file(&path) {
                self.add_source_unit(
                    DeclOrigin::Source { path: path.clone() },
                    SourceText::File(path),
                    &content,
                );
                files += 1;
            }
        }
        debug!(files, "source root indexed");
        true
    }

    fn add_class_directory(&mut self, dir: &Path) -> bool {
        let _span = info_span!("class_directory", dir = %dir.display()).entered();
        let mut classes = 0usize;
        for path in walk_files(dir, "class") {
            let Ok(relative) = path.strip_prefix(dir) else {
                continue;
            };
            let binary = relative
                .with_extension("")
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            if let Some((name, package)) = indexable_class(&binary) {
                self.insert(name, &package, Location::ClassFile { path });
                classes += 1;
            }
        }
        debug!(classes, "class directory indexed");
        true
    }

    fn add_archive(&mut self, path: &Path) -> bool {
        let display_path = path.display().to_string();
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) => {
                self.report(
                    path,
                    diagnostic_codes::CANNOT_READ_ARCHIVE,
                    &[&display_path, &err.to_string()],
                );
                return false;
            }
        };
        let archive = match ZipArchive::new(BufReader::new(file)) {
            Ok(archive) => archive,
            Err(err) => {
                self.report(
                    path,
                    diagnostic_codes::CANNOT_READ_ARCHIVE,
                    &[&display_path, &err.to_string()],
                );
                return false;
            }
        };
        let _span = info_span!("archive", path = %display_path).entered();
        let entries: Vec<String> = archive
            .file_names()
            .filter(|name| name.ends_with(".class") && !name.starts_with("META-INF/"))
            .map(str::to_string)
            .collect();
        let archive_idx = self.index.archives.len();
        self.index.archives.push(ArchiveHandle {
            path: path.to_path_buf(),
            reader: Mutex::new(archive),
        });
        // Archive iteration order is arbitrary; sort for deterministic
        // shadowing inside one archive.
        let mut entries = entries;
        entries.sort();
        let mut classes = 0usize;
        for entry in entries {
            let binary = entry.trim_end_matches(".class");
            if let Some((name, package)) = indexable_class(binary) {
                self.insert(
                    name,
                    &package,
                    Location::Archive {
                        archive: archive_idx,
                        entry,
                    },
                );
                classes += 1;
            }
        }
        debug!(classes, "archive indexed");
        true
    }

    fn add_boot(&mut self) {
        let _span = info_span!("boot_library").entered();
        for source in BOOT_SOURCES {
            self.add_source_unit(
                DeclOrigin::Boot {
                    file_name: source.file_name.to_string(),
                },
                SourceText::Embedded(source.content),
                source.content,
            );
        }
    }
}

/// Regular files under `root` with the given extension, in a stable order.
/// Hidden files and directories are skipped.
fn walk_files(root: &Path, extension: &str) -> Vec<PathBuf> {
    WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !e.file_name().to_string_lossy().starts_with('.'))
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == extension))
        .map(walkdir::DirEntry::into_path)
        .collect()
}

/// Canonical name and package for a class file binary name
/// (`p/Outer$Inner`), or `None` for anonymous, local and module metadata
/// classes.
fn indexable_class(binary: &str) -> Option<(String, String)> {
    let (package_path, class_name) = match binary.rsplit_once('/') {
        Some((package, class)) => (package, class),
        None => ("", binary),
    };
    if class_name == "module-info" || class_name == "package-info" || class_name.is_empty() {
        return None;
    }
    let local_or_anonymous = class_name
        .split('$')
        .skip(1)
        .any(|segment| segment.is_empty() || segment.starts_with(|c: char| c.is_ascii_digit()));
    if local_or_anonymous {
        return None;
    }
    Some((
        canonical_from_binary(binary),
        package_path.replace('/', "."),
    ))
}

impl ClasspathIndex {
    /// An index with only the boot library.
    #[must_use]
    pub fn boot_only() -> ClasspathIndex {
        let mut builder = IndexBuilder::default();
        builder.add_boot();
        builder.index
    }

    /// An index with no entries at all.
    #[must_use]
    pub fn empty() -> ClasspathIndex {
        IndexBuilder::default().index
    }

    /// True when `name` (canonical, fully-qualified) is indexed.
    #[must_use]
    pub fn contains_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// True when at least one indexed type lives in `name` or a subpackage.
    #[must_use]
    pub fn has_package(&self, name: &str) -> bool {
        self.packages.contains(name)
    }

    /// Where `name` is declared.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<DeclOrigin> {
        self.types.get(name).map(|e| self.origin_of(&e.location))
    }

    /// The declaration of `name`, loaded on first request.
    ///
    /// Returns `None` when the name is not indexed or its declaration cannot
    /// be loaded (unreadable file, corrupt class file).
    #[must_use]
    pub fn type_decl(&self, name: &str) -> Option<Arc<TypeDecl>> {
        let entry = self.types.get(name)?;
        entry
            .decl
            .get_or_init(|| self.load(name, &entry.location))
            .clone()
    }

    /// Configuration diagnostics recorded while building.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Every indexed name, sorted.
    #[must_use]
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.types.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn origin_of(&self, location: &Location) -> DeclOrigin {
        match location {
            Location::Source { unit } => self.source_units[*unit].origin.clone(),
            Location::ClassFile { path } => DeclOrigin::ClassFile { path: path.clone() },
            Location::Archive { archive, entry } => DeclOrigin::Archive {
                archive: self.archives[*archive].path.clone(),
                entry: entry.clone(),
            },
        }
    }

    fn load(&self, name: &str, location: &Location) -> Option<Arc<TypeDecl>> {
        match location {
            Location::Source { unit } => self
                .source_decls(*unit)
                .iter()
                .find(|d| d.name == name)
                .cloned(),
            _ => {
                let origin = self.origin_of(location);
                let result = self
                    .read_class_bytes(location)
                    .and_then(|bytes| read_class_file(&bytes, origin.clone()));
                match result {
                    Ok(decl) => {
                        trace!(name, %origin, "class file decoded");
                        Some(Arc::new(decl))
                    }
                    Err(err) => {
                        warn!(name, %origin, %err, "cannot decode class file");
                        None
                    }
                }
            }
        }
    }

    fn read_class_bytes(&self, location: &Location) -> Result<Vec<u8>, ClassFileError> {
        match location {
            Location::ClassFile { path } => {
                let io = |source| ClassFileError::Io {
                    path: path.clone(),
                    source,
                };
                let len = std::fs::metadata(path).map_err(io)?.len();
                if len > MAX_CLASS_FILE_BYTES {
                    return Err(ClassFileError::TooLarge {
                        limit: MAX_CLASS_FILE_BYTES,
                    });
                }
                std::fs::read(path).map_err(io)
            }
            Location::Archive { archive, entry } => {
                let handle = &self.archives[*archive];
                let mut reader = handle.reader.lock().unwrap_or_else(PoisonError::into_inner);
                let archive_err = |source| ClassFileError::Archive {
                    entry: entry.clone(),
                    source,
                };
                let mut file = reader.by_name(entry).map_err(archive_err)?;
                if file.size() > MAX_CLASS_FILE_BYTES {
                    return Err(ClassFileError::TooLarge {
                        limit: MAX_CLASS_FILE_BYTES,
                    });
                }
                let mut bytes = Vec::with_capacity(file.size() as usize);
                file.read_to_end(&mut bytes)
                    .map_err(|source| ClassFileError::Io {
                        path: handle.path.join(entry),
                        source,
                    })?;
                Ok(bytes)
            }
            Location::Source { .. } => Ok(Vec::new()),
        }
    }

    /// Decoded text of a source root file. Unreadable and binary files are
    /// logged and skipped.
    fn read_source_file(&self, path: &Path) -> Option<String> {
        match read_source(path, self.encoding) {
            Ok(decoded) => {
                if let Some(warning) = decoded.diagnostics.first() {
                    debug!(path = %path.display(), message = %warning.message_text, "source root file decoded lossily");
                }
                Some(decoded.text)
            }
            Err(diagnostic) => {
                warn!(path = %path.display(), message = %diagnostic.message_text, "cannot read source file");
                None
            }
        }
    }

    /// Parse a source unit once and extract all of its declarations.
    fn source_decls(&self, unit: usize) -> &[Arc<TypeDecl>] {
        let unit = &self.source_units[unit];
        unit.decls.get_or_init(|| {
            let text = match &unit.text {
                SourceText::Embedded(content) => (*content).to_string(),
                SourceText::File(path) => match self.read_source_file(path) {
                    Some(text) => text,
                    None => return Vec::new(),
                },
            };
            let file_name = unit.origin.to_string();
            let _span = info_span!("load_source_decls", file = %file_name).entered();
            let parsed = jvz_parser::parse(&file_name, &text);
            let exists = |name: &str| self.contains_type(name);
            extract_type_decls(&parsed.arena, parsed.root, &unit.origin, &exists)
                .into_iter()
                .map(Arc::new)
                .collect()
        })
    }
}
