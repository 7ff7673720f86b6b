//! `glint fix`

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use glint_core::{GlintError, OutputFormat, Severity, SyntaxTree};
use rayon::prelude::*;
use tracing::{debug, info, warn};

use super::{Session, read_source, renderer};
use crate::GlobalOptions;

/// Outcome of fixing one file
struct FixedFile {
    path: PathBuf,
    before: String,
    after: String,
    applied: usize,
    remaining_errors: usize,
}

impl FixedFile {
    fn changed(&self) -> bool {
        self.before != self.after
    }
}

pub fn fix_command(
    paths: Vec<PathBuf>,
    dry_run: bool,
    max_iterations: usize,
    options: &GlobalOptions,
) -> anyhow::Result<ExitCode> {
    let session = Session::open(paths, options)?;

    let results = session
        .files
        .par_iter()
        .map(|path| -> glint_core::Result<FixedFile> {
            let before = read_source(path)?;
            let tree = SyntaxTree::parse(&before);
            let report = session.engine.fix_all(&tree, max_iterations);
            debug!(
                file = %path.display(),
                applied = report.applied.len(),
                iterations = report.iterations,
                "Fixed file"
            );
            if report.iterations > max_iterations {
                warn!(file = %path.display(), "Fix limit reached, some fixes were not applied");
            }
            Ok(FixedFile {
                path: path.clone(),
                after: report.tree.text(),
                before,
                applied: report.applied.len(),
                remaining_errors: report
                    .remaining
                    .iter()
                    .filter(|d| d.severity == Severity::Error)
                    .count(),
            })
        })
        .collect::<glint_core::Result<Vec<_>>>()?;

    let renderer = renderer(OutputFormat::Text, options);
    let mut changed_files = 0;
    for file in results.iter().filter(|f| f.changed()) {
        changed_files += 1;
        if dry_run {
            print!("{}", renderer.render_diff(&file.path, &file.before, &file.after));
        } else {
            fs::write(&file.path, &file.after).map_err(|e| GlintError::io_error(&file.path, e))?;
        }
    }

    let applied: usize = results.iter().map(|f| f.applied).sum();
    let verb = if dry_run { "Would fix" } else { "Fixed" };
    println!("{verb} {changed_files} of {} file(s), {applied} fix(es)", results.len());
    info!(files = changed_files, fixes = applied, dry_run, "Fix finished");

    let remaining_errors: usize = results.iter().map(|f| f.remaining_errors).sum();
    Ok(if remaining_errors > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}
