//! `jvz.json` project configuration and its merge with command-line flags.

use anyhow::{Context, Result, bail};
use jvz_core::SourceEncoding;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::args::{CliArgs, OutputFormat};

pub const CONFIG_FILE_NAME: &str = "jvz.json";

/// Settings read from `jvz.json`. Paths are relative to the file's directory.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProjectConfig {
    #[serde(default)]
    pub source_roots: Option<Vec<String>>,
    #[serde(default)]
    pub classpath: Option<Vec<String>>,
    #[serde(default)]
    pub encoding: Option<SourceEncoding>,
    #[serde(default)]
    pub exclude: Option<Vec<String>>,
    #[serde(default)]
    pub bindings: Option<bool>,
    #[serde(default)]
    pub boot: Option<bool>,
    #[serde(default)]
    pub jobs: Option<usize>,
    #[serde(default)]
    pub warnings: Option<bool>,
    #[serde(default)]
    pub format: Option<OutputFormat>,
}

pub fn parse_config(source: &str) -> Result<ProjectConfig> {
    let stripped = strip_jsonc(source);
    let normalized = remove_trailing_commas(&stripped);
    let config = serde_json::from_str(&normalized).context("failed to parse jvz.json")?;
    Ok(config)
}

pub fn load_config(path: &Path) -> Result<ProjectConfig> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    parse_config(&source).with_context(|| format!("failed to parse config: {}", path.display()))
}

/// Effective settings for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub project: PathBuf,
    /// Name printed in the final summary line.
    pub project_name: String,
    pub source_roots: Vec<PathBuf>,
    pub classpath: Vec<PathBuf>,
    pub encoding: SourceEncoding,
    pub exclude: Vec<String>,
    pub resolve_bindings: bool,
    pub include_boot: bool,
    pub jobs: Option<usize>,
    pub sequential: bool,
    pub warnings: bool,
    pub format: OutputFormat,
    pub pretty: bool,
    pub pause: bool,
}

/// Merge command-line flags over `jvz.json` over the conventional layout.
pub fn resolve_settings(args: &CliArgs, default_pretty: bool) -> Result<Settings> {
    let project = args.project.clone();
    if !project.is_dir() {
        bail!("project directory {} does not exist", project.display());
    }

    let config_path = match &args.config {
        Some(path) => Some(path.clone()),
        None => Some(project.join(CONFIG_FILE_NAME)).filter(|p| p.is_file()),
    };
    let (config, config_dir) = match config_path {
        Some(path) => {
            let config = load_config(&path)?;
            let dir = path
                .parent()
                .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
            (config, dir)
        }
        None => (ProjectConfig::default(), project.clone()),
    };

    let source_roots = if !args.source_roots.is_empty() {
        args.source_roots.clone()
    } else if let Some(roots) = &config.source_roots {
        roots.iter().map(|r| config_dir.join(r)).collect()
    } else {
        vec![project.join("src")]
    };

    let classpath = if let Some(list) = &args.classpath {
        std::env::split_paths(list).filter(|p| !p.as_os_str().is_empty()).collect()
    } else if let Some(entries) = &config.classpath {
        entries.iter().map(|e| config_dir.join(e)).collect()
    } else {
        conventional_classpath(&project)?
    };

    let mut exclude = config.exclude.clone().unwrap_or_default();
    exclude.extend(args.exclude.iter().cloned());

    Ok(Settings {
        project_name: project_name(&project),
        project,
        source_roots,
        classpath,
        encoding: args.encoding.or(config.encoding).unwrap_or_default(),
        exclude,
        resolve_bindings: !args.no_bindings && config.bindings.unwrap_or(true),
        include_boot: !args.no_boot && config.boot.unwrap_or(true),
        jobs: args.jobs.or(config.jobs),
        sequential: args.sequential,
        warnings: args.warnings || config.warnings.unwrap_or(false),
        format: args.format.or(config.format).unwrap_or_default(),
        pretty: args.pretty.unwrap_or(default_pretty),
        pause: args.pause,
    })
}

/// `PROJECT/classes` followed by `PROJECT/libs/*.jar` in name order. Missing
/// directories contribute nothing.
fn conventional_classpath(project: &Path) -> Result<Vec<PathBuf>> {
    let mut entries = Vec::new();
    let classes = project.join("classes");
    if classes.is_dir() {
        entries.push(classes);
    }
    let libs = project.join("libs");
    if libs.is_dir() {
        let mut jars = Vec::new();
        for entry in std::fs::read_dir(&libs).with_context(|| format!("failed to list {}", libs.display()))? {
            let path = entry
                .with_context(|| format!("failed to list {}", libs.display()))?
                .path();
            if path.is_file() && path.extension().is_some_and(|ext| ext == "jar") {
                jars.push(path);
            }
        }
        jars.sort();
        entries.extend(jars);
    }
    Ok(entries)
}

fn project_name(project: &Path) -> String {
    let resolved = std::fs::canonicalize(project).unwrap_or_else(|_| project.to_path_buf());
    resolved
        .file_name()
        .map_or_else(|| project.display().to_string(), |n| n.to_string_lossy().into_owned())
}

fn strip_jsonc(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;
    let mut in_line_comment = false;
    let mut in_block_comment = false;

    while let Some(ch) = chars.next() {
        if in_line_comment {
            if ch == '\n' {
                in_line_comment = false;
                out.push(ch);
            }
            continue;
        }

        if in_block_comment {
            if ch == '*' && chars.peek() == Some(&'/') {
                chars.next();
                in_block_comment = false;
            } else if ch == '\n' {
                out.push(ch);
            }
            continue;
        }

        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        match (ch, chars.peek()) {
            ('"', _) => {
                in_string = true;
                out.push(ch);
            }
            ('/', Some('/')) => {
                chars.next();
                in_line_comment = true;
            }
            ('/', Some('*')) => {
                chars.next();
                in_block_comment = true;
            }
            _ => out.push(ch),
        }
    }

    out
}

fn remove_trailing_commas(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();
    let mut in_string = false;
    let mut escape = false;

    while let Some(ch) = chars.next() {
        if in_string {
            out.push(ch);
            if escape {
                escape = false;
            } else if ch == '\\' {
                escape = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '"' {
            in_string = true;
        } else if ch == ',' {
            let next = chars.clone().find(|c| !c.is_whitespace());
            if matches!(next, Some('}' | ']')) {
                continue;
            }
        }
        out.push(ch);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_jsonc_with_trailing_commas() {
        let source = r#"{
            // layout
            "sourceRoots": ["src", "gen",],
            /* archives */ "classpath": ["libs/a.jar"],
            "encoding": "ISO-8859-1",
            "exclude": ["**/generated/**"],
        }"#;
        let config = parse_config(source).unwrap();
        assert_eq!(config.source_roots, Some(vec!["src".to_string(), "gen".to_string()]));
        assert_eq!(config.classpath, Some(vec!["libs/a.jar".to_string()]));
        assert_eq!(config.encoding, Some(SourceEncoding::Latin1));
        assert_eq!(config.exclude, Some(vec!["**/generated/**".to_string()]));
    }

    #[test]
    fn test_comment_markers_inside_strings_are_kept() {
        let config = parse_config(r#"{ "sourceRoots": ["a//b", "c/*d*/"] }"#).unwrap();
        assert_eq!(
            config.source_roots,
            Some(vec!["a//b".to_string(), "c/*d*/".to_string()])
        );
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        assert!(parse_config(r#"{ "sourceRoot": "src" }"#).is_err());
    }
}
