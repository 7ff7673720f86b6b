//! CLI command implementations
//!
//! Every command resolves configuration the same way: an explicit
//! `--config` wins, otherwise the nearest `.glintrc.*` above the first path
//! is used, otherwise the defaults apply.

pub mod check;
pub mod fix;
pub mod rules;

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use glint_core::{
    ConfigLoader, DiagnosticRenderer, GlintError, LoadedConfig, OutputFormat, RuleSelection,
};
use glint_rules::{Engine, RuleRegistry};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::GlobalOptions;

/// Engine and input files of one invocation
pub struct Session {
    pub engine: Engine,
    pub files: Vec<PathBuf>,
}

impl Session {
    pub fn open(paths: Vec<PathBuf>, options: &GlobalOptions) -> anyhow::Result<Self> {
        let paths = if paths.is_empty() {
            vec![PathBuf::from(".")]
        } else {
            paths
        };

        let start = start_dir(&paths[0]);
        let config = ConfigLoader::load(options.config.as_deref(), Some(start))
            .context("Failed to load configuration")?;

        let registry = RuleRegistry::with_builtin_rules();
        let selection = RuleSelection::resolve(&config.config.linter_config(), &registry.rule_infos());
        let engine = Engine::new(&registry, &selection);
        let files = discover_files(&paths, &config)?;
        debug!(
            config = ?config.source,
            files = files.len(),
            rules = engine.rule_count(),
            "Session ready"
        );
        Ok(Self { engine, files })
    }
}

fn start_dir(path: &Path) -> &Path {
    if path.is_file() {
        match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    } else {
        path
    }
}

/// Files named on the command line, plus matching files below directories
///
/// Explicit files are always taken. Directory contents are filtered by the
/// configured globs, relative to the walked directory.
fn discover_files(paths: &[PathBuf], config: &LoadedConfig) -> anyhow::Result<Vec<PathBuf>> {
    let matcher = config.config.files_config().matcher()?;
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.exists() {
            return Err(GlintError::io_error(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "no such file or directory"),
            )
            .into());
        }
        for entry in WalkDir::new(path).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let relative = entry.path().strip_prefix(path).unwrap_or(entry.path());
            if matcher.matches(relative) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

pub fn read_source(path: &Path) -> glint_core::Result<String> {
    fs::read_to_string(path).map_err(|e| GlintError::io_error(path, e))
}

pub fn renderer(format: OutputFormat, options: &GlobalOptions) -> DiagnosticRenderer {
    if options.no_color {
        DiagnosticRenderer::no_colors(format)
    } else {
        DiagnosticRenderer::new(format)
    }
}
