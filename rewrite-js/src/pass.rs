use crate::error::RewriteError;
use crate::fs::ModuleFs;
use crate::rewrite::ImportRewriter;
use serde::Serialize;
use std::path::Path;
use std::path::PathBuf;
use tracing::error;
use tracing::info;

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModuleStatus {
  Rewritten { imports: usize },
  Unchanged,
  ParseFailed { message: String },
  FileSystemFailed { message: String },
}

impl ModuleStatus {
  pub fn is_failure(&self) -> bool {
    matches!(
      self,
      ModuleStatus::ParseFailed { .. } | ModuleStatus::FileSystemFailed { .. }
    )
  }
}

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ModuleReport {
  /// Relative to the output root.
  pub path: PathBuf,
  #[serde(flatten)]
  pub status: ModuleStatus,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct RewriteReport {
  pub modules: Vec<ModuleReport>,
}

impl RewriteReport {
  pub fn rewritten(&self) -> usize {
    self
      .modules
      .iter()
      .filter(|m| matches!(m.status, ModuleStatus::Rewritten { .. }))
      .count()
  }

  pub fn unchanged(&self) -> usize {
    self
      .modules
      .iter()
      .filter(|m| m.status == ModuleStatus::Unchanged)
      .count()
  }

  pub fn failures(&self) -> impl Iterator<Item = &ModuleReport> {
    self.modules.iter().filter(|m| m.status.is_failure())
  }
}

/// Rewrites every module in `modules` (paths relative to `output_root`), one after another.
///
/// Existence checks must observe the finished output tree, so this must only run once every module
/// has been emitted and every other file copied. A module that fails is reported and skipped.
pub fn rewrite_modules<F: ModuleFs>(
  rewriter: &ImportRewriter<F>,
  output_root: &Path,
  modules: &[PathBuf],
) -> RewriteReport {
  let verbose = rewriter.options().verbose;
  let mut report = RewriteReport::default();
  for module in modules {
    let path = output_root.join(module);
    let status = match rewriter.rewrite(&path) {
      Ok(outcome) => {
        if verbose {
          info!("{} has been scanned", path.display());
        };
        if outcome.is_rewritten() {
          if verbose {
            info!(imports = outcome.rewritten_imports(), "rewrote {}", path.display());
          };
          ModuleStatus::Rewritten {
            imports: outcome.rewritten_imports(),
          }
        } else {
          ModuleStatus::Unchanged
        }
      }
      Err(err) => {
        error!("{err}");
        match err {
          RewriteError::Parse(err) => ModuleStatus::ParseFailed {
            message: err.to_string(),
          },
          err @ RewriteError::FileSystem { .. } => ModuleStatus::FileSystemFailed {
            message: err.to_string(),
          },
        }
      }
    };
    report.modules.push(ModuleReport {
      path: module.clone(),
      status,
    });
  }
  report
}
