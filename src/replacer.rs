use crate::config::{ConfigLoader, Operation, PatchConfig};
use crate::errors::{Error, Result};
use crate::output_formatter::{OutputFormat, OutputFormatter};
use crate::patterns::Rule;
use serde::Serialize;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// What happened to a single target file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    /// The file does not exist; nothing was written.
    Missing,
    /// The rule changed the contents and the file was rewritten.
    Updated,
    /// The rule found nothing to change; the file was left untouched.
    Unchanged,
}

impl Outcome {
    /// The label printed in front of the path.
    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Missing => "warn: missing",
            Outcome::Updated => "updated",
            Outcome::Unchanged => "unchanged",
        }
    }

    pub fn is_changed(&self) -> bool {
        matches!(self, Outcome::Updated)
    }
}

/// Options for processing a file.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessOptions {
    /// If `true`, outcomes are computed but nothing is written to disk.
    pub dry_run: bool,
}

/// A target with its rule compiled and its path resolved against the root.
pub struct CompiledTarget {
    pub path: PathBuf,
    pub operation: Operation,
    pub rule: Rule,
}

/// The outcome for one target, in run order.
#[derive(Debug, Clone, Serialize)]
pub struct TargetReport {
    pub path: PathBuf,
    pub operation: &'static str,
    pub outcome: Outcome,
}

/// The result of a whole run.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub targets: Vec<TargetReport>,
    /// `true` if any target was updated. Informational only.
    pub changed: bool,
}

impl RunSummary {
    fn record(&mut self, report: TargetReport) {
        self.changed |= report.outcome.is_changed();
        self.targets.push(report);
    }
}

/// Applies compiled rules to their target files.
pub struct Replacer {
    targets: Vec<CompiledTarget>,
}

impl Replacer {
    /// Creates a new `Replacer` from a `PatchConfig`, resolving every target
    /// path against `root`.
    pub fn new(config: &PatchConfig, root: &Path) -> Result<Self> {
        let targets = config
            .targets
            .iter()
            .map(|target| {
                Ok(CompiledTarget {
                    path: root.join(&target.path),
                    operation: target.operation.clone(),
                    rule: Rule::compile(&target.operation)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { targets })
    }

    pub fn targets(&self) -> &[CompiledTarget] {
        &self.targets
    }

    /// Reads `path`, applies `rule` and writes the result back if it differs.
    ///
    /// A missing file yields [`Outcome::Missing`]; read and write failures
    /// are returned as errors.
    pub fn process_file(path: &Path, rule: &Rule, options: ProcessOptions) -> Result<Outcome> {
        if !path.exists() {
            return Ok(Outcome::Missing);
        }

        let content = fs::read_to_string(path).map_err(|e| Error::Processing {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;
        let rewrite = rule.apply(&content);
        debug!(path = %path.display(), changes = rewrite.changes, "applied rule");

        if !rewrite.differs_from(&content) {
            return Ok(Outcome::Unchanged);
        }

        if !options.dry_run {
            write_atomic(path, rewrite.text.as_ref())?;
        }
        Ok(Outcome::Updated)
    }

    /// Runs every target once, in order, calling `on_report` after each one.
    pub fn run<F>(&self, options: ProcessOptions, mut on_report: F) -> Result<RunSummary>
    where
        F: FnMut(&TargetReport) -> Result<()>,
    {
        let mut summary = RunSummary::default();

        for target in &self.targets {
            let outcome = Self::process_file(&target.path, &target.rule, options)?;
            let report = TargetReport {
                path: target.path.clone(),
                operation: target.operation.name(),
                outcome,
            };
            on_report(&report)?;
            summary.record(report);
        }

        debug!(changed = summary.changed, dry_run = options.dry_run, "patch run finished");
        Ok(summary)
    }
}

/// Replaces `path` with `contents` through a temporary file next to the real
/// file, keeping the original permissions.
///
/// Symlinks are followed so the file they point to is rewritten and the link
/// survives. If the directory does not accept new files, the file is
/// overwritten in place instead.
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let real_path = fs::canonicalize(path)?;
    let parent = match real_path.parent() {
        Some(parent) => parent,
        None => {
            return Err(format!("Could not get parent directory for {}", path.display()).into());
        }
    };

    let mut temp_file = match NamedTempFile::new_in(parent) {
        Ok(temp_file) => temp_file,
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            debug!(path = %real_path.display(), "directory not writable, rewriting in place");
            fs::write(&real_path, contents)?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };
    temp_file.write_all(contents.as_bytes())?;

    let perms = fs::metadata(&real_path)?.permissions();
    fs::set_permissions(temp_file.path(), perms)?;

    temp_file.persist(&real_path)?;
    Ok(())
}

/// The main entry point for a patch run.
///
/// This function:
/// 1. Loads the configuration from a YAML file, or uses the built-in UMA targets.
/// 2. Resolves the project root from `--root` or the executable's location.
/// 3. Patches each target in order, printing one line per target.
pub fn run_patch(
    root: Option<PathBuf>,
    config_file: Option<PathBuf>,
    dry_run: bool,
    format: OutputFormat,
) -> Result<RunSummary> {
    let config = match config_file {
        Some(cfg_path) => {
            let resolved_path = ConfigLoader::find_config(&cfg_path, root.as_deref())?;
            debug!(config = %resolved_path.display(), "using config file");
            ConfigLoader::load_patch_config(&resolved_path)?
        }
        None => PatchConfig::default(),
    };

    let root = ConfigLoader::resolve_root(root.as_deref(), config.root_levels)?;
    debug!(root = %root.display(), "resolved project root");

    let replacer = Replacer::new(&config, &root)?;
    let formatter = OutputFormatter::new(format);
    let options = ProcessOptions { dry_run };

    let stdout = io::stdout();
    let summary = replacer.run(options, |report| {
        if let Some(line) = formatter.format_line(report) {
            writeln!(stdout.lock(), "{line}")?;
        }
        Ok(())
    })?;

    if let Some(document) = formatter.format_summary(&summary)? {
        writeln!(stdout.lock(), "{document}")?;
    }

    Ok(summary)
}
