//! `glint check`

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use glint_core::{Diagnostic, OutputFormat, Severity, SyntaxTree};
use rayon::prelude::*;
use tracing::{info, warn};

use super::{Session, read_source, renderer};
use crate::GlobalOptions;

/// One analyzed file
pub struct FileReport {
    pub path: PathBuf,
    pub source: String,
    pub diagnostics: Vec<Diagnostic>,
}

/// Counts over all reported diagnostics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub files: usize,
    pub errors: usize,
    pub warnings: usize,
    pub infos: usize,
}

impl Summary {
    pub fn of(reports: &[FileReport]) -> Self {
        let mut summary = Self {
            files: reports.len(),
            ..Self::default()
        };
        for diagnostic in reports.iter().flat_map(|r| &r.diagnostics) {
            match diagnostic.severity {
                Severity::Error => summary.errors += 1,
                Severity::Warning => summary.warnings += 1,
                Severity::Info => summary.infos += 1,
                Severity::Hidden => {}
            }
        }
        summary
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn exit_code(&self) -> ExitCode {
        if self.has_errors() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

pub fn check_command(
    paths: Vec<PathBuf>,
    format: OutputFormat,
    show_source: bool,
    options: &GlobalOptions,
) -> anyhow::Result<ExitCode> {
    let start = Instant::now();
    let session = Session::open(paths, options)?;

    let reports = session
        .files
        .par_iter()
        .map(|path| -> glint_core::Result<FileReport> {
            let source = read_source(path)?;
            let tree = SyntaxTree::parse(&source);
            if tree.has_errors() {
                warn!(
                    file = %path.display(),
                    errors = tree.errors().len(),
                    "File has syntax errors, results may be incomplete"
                );
            }
            let diagnostics = session.engine.check(&tree);
            Ok(FileReport {
                path: path.clone(),
                source,
                diagnostics,
            })
        })
        .collect::<glint_core::Result<Vec<_>>>()?;

    let renderer = renderer(format, options).with_code_frames(show_source);
    let summary = Summary::of(&reports);
    match format {
        OutputFormat::Json => {
            let files = reports
                .iter()
                .map(|r| (r.path.as_path(), r.source.as_str(), r.diagnostics.as_slice()));
            println!("{}", renderer.render_json(files));
        }
        OutputFormat::Text => {
            for report in &reports {
                print!(
                    "{}",
                    renderer.render_file(&report.path, &report.source, &report.diagnostics)
                );
            }
            println!(
                "Checked {} file(s): {} error(s), {} warning(s), {} info",
                summary.files, summary.errors, summary.warnings, summary.infos
            );
        }
    }

    info!(
        files = summary.files,
        errors = summary.errors,
        elapsed = ?start.elapsed(),
        "Check finished"
    );
    Ok(summary.exit_code())
}
