//! Parallel batch driver.
//!
//! A batch runs in four phases:
//!
//! 1. **Parse** (parallel): read, decode and parse every file on its own
//!    rayon task. Each file gets its own `NodeArena`.
//! 2. **Collect siblings** (sequential): extract the type declarations of
//!    every parsed unit into one frozen `SiblingDecls`.
//! 3. **Bind** (parallel): resolve each unit against the siblings and the
//!    classpath index. Both are shared read-only.
//! 4. **Merge**: parser and binder diagnostics are merged per file with a
//!    stable sort, then line/column ranges are filled in.
//!
//! Results keep the input order, so parallel and sequential runs produce
//! identical output.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use indexmap::IndexMap;
use indexmap::map::Entry;
use jvz_binder::{BindEnv, BindingTable, SiblingDecls, SiblingUnit, bind};
use jvz_classpath::ClasspathIndex;
use jvz_common::diagnostics::{count_by_severity, resolve_ranges};
use jvz_common::{Diagnostic, DiagnosticCategory, LineMap, merge_diagnostics};
use jvz_parser::{NodeArena, NodeIndex, ParseResult, parse};
use rayon::prelude::*;
use tracing::{debug, info, info_span};

use crate::source_text::{SourceEncoding, read_source};

/// Options for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Run the binder after parsing. Syntax-only runs skip it.
    pub resolve_bindings: bool,
    /// Encoding of files without a byte order mark.
    pub encoding: SourceEncoding,
    /// Worker threads; `None` uses rayon's global pool.
    pub jobs: Option<usize>,
    /// Process files one after another on the calling thread.
    pub sequential: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        BatchOptions {
            resolve_bindings: true,
            encoding: SourceEncoding::Utf8,
            jobs: None,
            sequential: false,
        }
    }
}

/// One input of a batch: a path to read, or text already in memory.
#[derive(Debug, Clone)]
pub enum SourceInput {
    Path(PathBuf),
    Text { name: String, text: String },
}

impl SourceInput {
    /// Identity of the file in results and diagnostics.
    #[must_use]
    pub fn name(&self) -> String {
        match self {
            SourceInput::Path(path) => path.display().to_string(),
            SourceInput::Text { name, .. } => name.clone(),
        }
    }
}

impl From<PathBuf> for SourceInput {
    fn from(path: PathBuf) -> Self {
        SourceInput::Path(path)
    }
}

impl From<&Path> for SourceInput {
    fn from(path: &Path) -> Self {
        SourceInput::Path(path.to_path_buf())
    }
}

/// Everything produced for one file.
#[derive(Debug)]
pub struct CompilationResult {
    pub file_name: String,
    /// Decoded source text; empty when the file could not be read.
    pub text: String,
    pub arena: NodeArena,
    pub root: NodeIndex,
    /// Parser, binder and I/O diagnostics in stable order with ranges filled.
    pub diagnostics: Vec<Diagnostic>,
    /// Present when the batch ran with bindings.
    pub bindings: Option<BindingTable>,
    pub line_map: LineMap,
}

impl CompilationResult {
    #[must_use]
    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }
}

/// Aggregate counts and phase timings of a batch.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct BatchSummary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    /// Files with at least one error.
    pub files_with_errors: usize,
    /// Bytes of decoded source text.
    pub total_bytes: usize,
    pub total_nodes: usize,
    #[serde(skip)]
    pub parse_time: Duration,
    #[serde(skip)]
    pub bind_time: Duration,
}

/// Results of a batch in input order, plus the classpath diagnostics that
/// applied to the whole run.
#[derive(Debug)]
pub struct BatchResult {
    pub files: IndexMap<String, CompilationResult>,
    pub configuration: Vec<Diagnostic>,
    pub summary: BatchSummary,
}

impl BatchResult {
    /// Every diagnostic of the run: configuration first, then per file.
    pub fn diagnostics(&self) -> impl Iterator<Item = &Diagnostic> {
        self.configuration
            .iter()
            .chain(self.files.values().flat_map(|r| r.diagnostics.iter()))
    }
}

/// Parse and (optionally) bind `inputs` against `index`.
///
/// Per-file problems, including unreadable files, become diagnostics on that
/// file. The only hard failure is a thread pool that cannot be created.
pub fn run(inputs: &[SourceInput], index: &ClasspathIndex, options: &BatchOptions) -> Result<BatchResult> {
    let _span = info_span!("batch", files = inputs.len(), bindings = options.resolve_bindings).entered();
    match options.jobs {
        Some(jobs) if !options.sequential => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .thread_name(|i| format!("jvz-worker-{i}"))
                .build()
                .with_context(|| format!("failed to start {jobs} worker threads"))?;
            Ok(pool.install(|| run_phases(inputs, index, options)))
        }
        _ => Ok(run_phases(inputs, index, options)),
    }
}

/// Convenience wrapper for paths on disk.
pub fn run_paths(paths: &[PathBuf], index: &ClasspathIndex, options: &BatchOptions) -> Result<BatchResult> {
    let inputs: Vec<SourceInput> = paths.iter().cloned().map(SourceInput::from).collect();
    run(&inputs, index, options)
}

struct ParsedFile {
    name: String,
    text: String,
    parsed: ParseResult,
    /// Decoding warnings and read failures.
    input_diagnostics: Vec<Diagnostic>,
}

fn run_phases(inputs: &[SourceInput], index: &ClasspathIndex, options: &BatchOptions) -> BatchResult {
    let inputs = unique_inputs(inputs);
    let parse_start = Instant::now();
    let parsed: Vec<ParsedFile> = {
        let _span = info_span!("parse_files").entered();
        map_inputs(&inputs, options.sequential, |input| load_and_parse(input, options.encoding))
    };
    let parse_time = parse_start.elapsed();

    let bind_start = Instant::now();
    let bound: Vec<Option<jvz_binder::BindResult>> = if options.resolve_bindings {
        let units: Vec<SiblingUnit<'_>> = parsed
            .iter()
            .map(|file| SiblingUnit {
                arena: &file.parsed.arena,
                root: file.parsed.root,
                path: Path::new(&file.name),
            })
            .collect();
        let siblings = SiblingDecls::collect(&units, index);
        let _span = info_span!("bind_files", siblings = siblings.len()).entered();
        map_inputs(&parsed, options.sequential, |file| {
            let env = BindEnv::new(index, &siblings);
            Some(bind(&file.parsed.arena, file.parsed.root, &file.name, env))
        })
    } else {
        parsed.iter().map(|_| None).collect()
    };
    let bind_time = bind_start.elapsed();

    let mut summary = BatchSummary {
        parse_time,
        bind_time,
        ..BatchSummary::default()
    };
    let mut files = IndexMap::with_capacity(parsed.len());
    for (file, bind_result) in parsed.into_iter().zip(bound) {
        let result = finish_file(file, bind_result);
        let Entry::Vacant(slot) = files.entry(result.file_name.clone()) else {
            continue;
        };
        let (errors, warnings) = count_by_severity(&result.diagnostics);
        summary.files += 1;
        summary.errors += errors;
        summary.warnings += warnings;
        summary.files_with_errors += usize::from(errors > 0);
        summary.total_bytes += result.text.len();
        summary.total_nodes += result.arena.len();
        slot.insert(result);
    }

    let configuration = index.diagnostics().to_vec();
    let (errors, warnings) = count_by_severity(&configuration);
    summary.errors += errors;
    summary.warnings += warnings;

    info!(
        files = summary.files,
        errors = summary.errors,
        warnings = summary.warnings,
        parse_ms = parse_time.as_millis() as u64,
        bind_ms = bind_time.as_millis() as u64,
        "batch finished"
    );
    BatchResult {
        files,
        configuration,
        summary,
    }
}

/// Inputs in order with repeated names dropped. A repeated input keeps its
/// first occurrence and is neither parsed nor bound again.
fn unique_inputs(inputs: &[SourceInput]) -> Vec<&SourceInput> {
    let mut unique: IndexMap<String, &SourceInput> = IndexMap::with_capacity(inputs.len());
    for input in inputs {
        match unique.entry(input.name()) {
            Entry::Vacant(slot) => {
                slot.insert(input);
            }
            Entry::Occupied(slot) => debug!(file = %slot.key(), "repeated input ignored"),
        }
    }
    unique.into_values().collect()
}

/// Map over `items` in parallel, or in order on this thread. Output order
/// always matches input order.
fn map_inputs<T, R, F>(items: &[T], sequential: bool, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync + Send,
{
    if sequential {
        items.iter().map(f).collect()
    } else {
        items.par_iter().map(f).collect()
    }
}

fn load_and_parse(input: &SourceInput, encoding: SourceEncoding) -> ParsedFile {
    let name = input.name();
    let loaded = match input {
        SourceInput::Path(path) => read_source(path, encoding),
        SourceInput::Text { text, .. } => Ok(crate::source_text::DecodedSource {
            text: text.clone(),
            diagnostics: Vec::new(),
        }),
    };
    let (text, input_diagnostics) = match loaded {
        Ok(decoded) => (decoded.text, decoded.diagnostics),
        Err(diagnostic) => (String::new(), vec![diagnostic]),
    };
    let parsed = parse(&name, &text);
    debug!(file = %name, nodes = parsed.arena.len(), diagnostics = parsed.diagnostics.len(), "parsed");
    ParsedFile {
        name,
        text,
        parsed,
        input_diagnostics,
    }
}

fn finish_file(file: ParsedFile, bind_result: Option<jvz_binder::BindResult>) -> CompilationResult {
    let ParsedFile {
        name,
        text,
        parsed,
        mut input_diagnostics,
    } = file;
    let (bindings, binder_diagnostics) = match bind_result {
        Some(result) => (Some(result.bindings), result.diagnostics),
        None => (None, Vec::new()),
    };
    input_diagnostics.extend(parsed.diagnostics);
    let mut diagnostics = merge_diagnostics(input_diagnostics, binder_diagnostics);
    let line_map = LineMap::build(&text);
    resolve_ranges(&mut diagnostics, &line_map, &text);
    CompilationResult {
        file_name: name,
        text,
        arena: parsed.arena,
        root: parsed.root,
        diagnostics,
        bindings,
        line_map,
    }
}

// =============================================================================
// Parse-only helpers
// =============================================================================

/// Statistics for a parse-only run.
#[derive(Debug, Clone, Default)]
pub struct ParseStats {
    pub file_count: usize,
    pub total_bytes: usize,
    pub total_nodes: usize,
    pub error_count: usize,
}

/// Parse `(name, text)` pairs in parallel, keeping input order.
#[must_use]
pub fn parse_files_parallel(files: Vec<(String, String)>) -> Vec<ParseResult> {
    files
        .into_par_iter()
        .map(|(name, text)| parse(&name, &text))
        .collect()
}

/// Parse in parallel and report totals.
#[must_use]
pub fn parse_files_with_stats(files: Vec<(String, String)>) -> (Vec<ParseResult>, ParseStats) {
    let total_bytes = files.iter().map(|(_, text)| text.len()).sum();
    let results = parse_files_parallel(files);
    let stats = ParseStats {
        file_count: results.len(),
        total_bytes,
        total_nodes: results.iter().map(|r| r.arena.len()).sum(),
        error_count: results
            .iter()
            .flat_map(|r| r.diagnostics.iter())
            .filter(|d| d.category == DiagnosticCategory::Error)
            .count(),
    };
    (results, stats)
}
