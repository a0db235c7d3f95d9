//! Batch driver for the jvz Java front end.
//!
//! - `parallel` - parse, collect sibling declarations and bind a file set
//!   on rayon, returning per-file `CompilationResult`s in input order
//! - `source_text` - source decoding, shared with the classpath index
//! - `tracing_config` - `JVZ_LOG` / `JVZ_LOG_FORMAT` subscriber setup

pub mod parallel;
pub mod tracing_config;

pub use parallel::{
    BatchOptions, BatchResult, BatchSummary, CompilationResult, ParseStats, SourceInput,
    parse_files_parallel, parse_files_with_stats, run, run_paths,
};
pub use jvz_common::source_text;
pub use source_text::{DecodedSource, SourceEncoding, decode_source, read_source};

pub use jvz_binder as binder;
pub use jvz_classpath as classpath;
pub use jvz_common as common;
pub use jvz_parser as parser;

#[cfg(test)]
#[path = "../tests/parallel_tests.rs"]
mod parallel_tests;
