use colored::Colorize;
use jvz_common::{Diagnostic, DiagnosticCategory, LineMap};
use jvz_core::{BatchResult, BatchSummary, CompilationResult};
use serde::Serialize;

/// Text report: files with problems, each followed by its indented
/// diagnostics.
pub struct Reporter {
    color: bool,
    warnings: bool,
}

impl Reporter {
    pub fn new(color: bool, warnings: bool) -> Self {
        Reporter { color, warnings }
    }

    fn is_listed(&self, diagnostic: &Diagnostic) -> bool {
        match diagnostic.category {
            DiagnosticCategory::Error => true,
            DiagnosticCategory::Warning => self.warnings,
            DiagnosticCategory::Info => false,
        }
    }

    pub fn render(&self, batch: &BatchResult) -> String {
        let mut out = String::new();
        let configuration: Vec<&Diagnostic> = batch
            .configuration
            .iter()
            .filter(|d| self.is_listed(d))
            .collect();
        if !configuration.is_empty() {
            out.push_str(&self.format_header("classpath"));
            out.push('\n');
            for diagnostic in configuration {
                out.push_str("  ");
                out.push_str(&self.format_line(diagnostic, None));
                out.push('\n');
            }
        }
        for (name, result) in &batch.files {
            let listed: Vec<&Diagnostic> = result.diagnostics.iter().filter(|d| self.is_listed(d)).collect();
            if listed.is_empty() {
                continue;
            }
            out.push_str(&self.format_header(name));
            out.push('\n');
            for diagnostic in listed {
                out.push_str("  ");
                out.push_str(&self.format_line(diagnostic, Some(result)));
                out.push('\n');
                if self.color
                    && let Some(snippet) = format_snippet(&result.line_map, &result.text, diagnostic)
                {
                    out.push_str(&self.paint_snippet(snippet));
                }
            }
        }
        out
    }

    fn format_header(&self, name: &str) -> String {
        if self.color {
            name.bold().to_string()
        } else {
            name.to_string()
        }
    }

    /// `line:col - error JVZ3001: message`
    fn format_line(&self, diagnostic: &Diagnostic, source: Option<&CompilationResult>) -> String {
        let location = match (&diagnostic.range, source) {
            (Some(range), _) => format!("{}:{}", range.start.line + 1, range.start.character + 1),
            (None, Some(result)) => {
                let position = result.line_map.offset_to_position(diagnostic.start, &result.text);
                format!("{}:{}", position.line + 1, position.character + 1)
            }
            (None, None) => diagnostic.file.clone(),
        };
        format!(
            "{location} - {} {}: {}",
            self.format_category(diagnostic.category),
            self.format_code(diagnostic.code),
            diagnostic.message_text
        )
    }

    fn format_category(&self, category: DiagnosticCategory) -> String {
        let label = match category {
            DiagnosticCategory::Error => "error",
            DiagnosticCategory::Warning => "warning",
            DiagnosticCategory::Info => "info",
        };
        if !self.color {
            return label.to_string();
        }
        match category {
            DiagnosticCategory::Error => label.red().bold().to_string(),
            DiagnosticCategory::Warning => label.yellow().bold().to_string(),
            DiagnosticCategory::Info => label.cyan().bold().to_string(),
        }
    }

    fn format_code(&self, code: u32) -> String {
        let label = format!("JVZ{code}");
        if self.color {
            label.bright_blue().to_string()
        } else {
            label
        }
    }

    fn paint_snippet(&self, (line, underline): (String, String)) -> String {
        format!("{line}\n        {}\n", underline.red())
    }
}

/// The source line of `diagnostic` and a `~` underline of its span:
///
/// ```text
///    12   int x = "s";
///                 ~~~
/// ```
fn format_snippet(line_map: &LineMap, text: &str, diagnostic: &Diagnostic) -> Option<(String, String)> {
    if diagnostic.length == 0 {
        return None;
    }
    let position = line_map.offset_to_position(diagnostic.start, text);
    let line_index = position.line as usize;
    let line_start = line_map.line_start(line_index)? as usize;
    let line_text = line_map.line_text(line_index, text).trim_end_matches(['\r', '\n']);
    let start = (diagnostic.start as usize).saturating_sub(line_start);
    let end = start + diagnostic.length as usize;

    let mut underline = String::new();
    for (offset, ch) in line_text.char_indices() {
        if offset >= end {
            break;
        }
        let marker = if offset >= start { '~' } else { ' ' };
        let width = if ch == '\t' { 4 } else { 1 };
        underline.extend(std::iter::repeat_n(marker, width));
    }
    if !underline.contains('~') {
        underline.push('~');
    }
    let line = format!("  {:>3}   {}", line_index + 1, line_text.replace('\t', "    "));
    Some((line, underline))
}

/// Thousands separators, as in `1,234`.
pub fn format_count(value: u128) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[derive(Serialize)]
struct JsonReport<'a> {
    project: &'a str,
    summary: &'a BatchSummary,
    configuration: &'a [Diagnostic],
    files: Vec<JsonFile<'a>>,
}

#[derive(Serialize)]
struct JsonFile<'a> {
    file: &'a str,
    diagnostics: &'a [Diagnostic],
}

/// Machine-readable report of every file and diagnostic.
pub fn render_json(project: &str, batch: &BatchResult) -> serde_json::Result<String> {
    let report = JsonReport {
        project,
        summary: &batch.summary,
        configuration: &batch.configuration,
        files: batch
            .files
            .iter()
            .map(|(name, result)| JsonFile {
                file: name,
                diagnostics: &result.diagnostics,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&report)
}
