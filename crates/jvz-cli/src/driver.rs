//! One run of the command: index the classpath, parse and bind every
//! source file, print the report.

use anyhow::{Context, Result};
use jvz_classpath::{ClasspathConfig, build_index};
use jvz_core::{BatchOptions, run_paths};
use std::io::{BufRead, Write};
use std::time::Instant;
use tracing::info_span;

use crate::args::OutputFormat;
use crate::config::Settings;
use crate::discovery::{build_excludes, discover_sources};
use crate::reporter::{Reporter, format_count, render_json};

/// Process exit status when the run found errors.
pub const EXIT_ERRORS: i32 = 1;
pub const EXIT_SUCCESS: i32 = 0;

/// Run with `settings`, writing the report to `out`. `input` is read only
/// for `--pause`. Returns the exit status.
pub fn execute<W: Write, R: BufRead>(settings: &Settings, out: &mut W, input: &mut R) -> Result<i32> {
    let _span = info_span!("jvz", project = %settings.project.display()).entered();
    let text = settings.format == OutputFormat::Text;

    let excludes = build_excludes(&settings.exclude)?;
    let files = discover_sources(&settings.source_roots, &excludes);

    let start = Instant::now();
    let classpath_config = ClasspathConfig {
        source_roots: if settings.resolve_bindings {
            settings.source_roots.clone()
        } else {
            Vec::new()
        },
        classpath: if settings.resolve_bindings {
            settings.classpath.clone()
        } else {
            Vec::new()
        },
        include_boot: settings.resolve_bindings && settings.include_boot,
        encoding: settings.encoding,
    };
    let index = build_index(&classpath_config).context("failed to build the classpath index")?;
    if text {
        writeln!(
            out,
            "Indexed classpath in {} ms ({} types)",
            format_count(start.elapsed().as_millis()),
            format_count(index.len() as u128)
        )?;
    }

    if settings.pause {
        write!(out, "Press enter to start parsing: ")?;
        out.flush()?;
        let mut line = String::new();
        input.read_line(&mut line).context("failed to read from stdin")?;
    }

    let options = BatchOptions {
        resolve_bindings: settings.resolve_bindings,
        encoding: settings.encoding,
        jobs: settings.jobs,
        sequential: settings.sequential,
    };
    let start = Instant::now();
    let batch = run_paths(&files, &index, &options)?;
    let elapsed = start.elapsed();

    match settings.format {
        OutputFormat::Text => {
            writeln!(
                out,
                "Parsed {} files in {} ms",
                format_count(batch.summary.files as u128),
                format_count(elapsed.as_millis())
            )?;
            let reporter = Reporter::new(settings.pretty, settings.warnings);
            write!(out, "{}", reporter.render(&batch))?;
            writeln!(
                out,
                "Found {} errors in {}",
                format_count(batch.summary.errors as u128),
                settings.project_name
            )?;
        }
        OutputFormat::Json => {
            let json = render_json(&settings.project_name, &batch).context("failed to serialize report")?;
            writeln!(out, "{json}")?;
        }
    }

    Ok(if batch.summary.errors > 0 {
        EXIT_ERRORS
    } else {
        EXIT_SUCCESS
    })
}
