use crate::error::FsOperation;
use crate::error::ParseError;
use crate::error::RewriteError;
use crate::error::StatementRewriteAnomaly;
use crate::fs::ModuleFs;
use crate::fs::RealFs;
use crate::options::RewriteOptions;
use crate::resolve::resolve;
use crate::resolve::Resolution;
use scan_js::inspect;
use scan_js::span::Span;
use scan_js::statement::ImportStmt;
use serde::Serialize;
use std::path::Path;
use tracing::info;
use tracing::warn;

#[derive(Clone, PartialEq, Eq, Debug, Serialize)]
pub struct ResolvedImport {
  /// Original specifier, trimmed of surrounding whitespace.
  pub specifier: String,
  #[serde(flatten)]
  pub resolution: Resolution,
}

#[derive(Clone, PartialEq, Eq, Debug, Default, Serialize)]
pub struct RewriteOutcome {
  /// The new module text, present only if at least one specifier changed.
  #[serde(skip)]
  pub text: Option<String>,
  pub imports: Vec<ResolvedImport>,
  pub anomalies: Vec<StatementRewriteAnomaly>,
}

impl RewriteOutcome {
  pub fn is_rewritten(&self) -> bool {
    self.text.is_some()
  }

  pub fn rewritten_imports(&self) -> usize {
    self
      .imports
      .iter()
      .filter(|i| i.resolution.is_rewrite())
      .count()
  }
}

enum StatementResult {
  Import(ResolvedImport, Option<String>),
  Anomaly(StatementRewriteAnomaly),
}

/// Rewrites the relative import specifiers of emitted modules so they name files explicitly.
#[derive(Clone, Debug)]
pub struct ImportRewriter<F = RealFs> {
  fs: F,
  options: RewriteOptions,
}

impl ImportRewriter<RealFs> {
  pub fn new(options: RewriteOptions) -> Self {
    Self { fs: RealFs, options }
  }
}

impl<F: ModuleFs> ImportRewriter<F> {
  /// Construct a rewriter with a custom filesystem implementation.
  pub fn with_fs(fs: F, options: RewriteOptions) -> Self {
    Self { fs, options }
  }

  pub fn options(&self) -> &RewriteOptions {
    &self.options
  }

  pub fn fs(&self) -> &F {
    &self.fs
  }

  /// Computes the rewritten text of the module at `path` without reading or writing it. Existence
  /// checks are still made relative to the directory of `path`.
  pub fn rewrite_text(&self, path: &Path, text: &str) -> Result<RewriteOutcome, ParseError> {
    let statements = inspect(text).map_err(|error| ParseError {
      file: path.to_path_buf(),
      error,
    })?;
    let module_dir = path.parent().unwrap_or(Path::new(""));

    let mut outcome = RewriteOutcome::default();
    let mut out = String::with_capacity(text.len() + 16);
    let mut modified = false;
    let mut cursor = 0;
    for (i, stmt) in statements.iter().enumerate() {
      let gap = &text[cursor..stmt.loc.0];
      if i > 0 && gap.is_empty() && !self.options.minify {
        out.push('\n');
      };
      out.push_str(gap);
      cursor = stmt.loc.1;

      let original = &text[stmt.loc.0..stmt.loc.1];
      let Some(import) = stmt.import() else {
        out.push_str(original);
        continue;
      };
      match self.rewrite_statement(module_dir, text, stmt.loc, import) {
        StatementResult::Import(resolved, rebuilt) => {
          if self.options.verbose && !resolved.resolution.is_rewrite() {
            info!(
              file = %path.display(),
              specifier = %resolved.specifier,
              resolution = ?resolved.resolution,
              "import left unchanged"
            );
          };
          match rebuilt {
            Some(rebuilt) => {
              modified = true;
              out.push_str(&rebuilt);
            }
            None => out.push_str(original),
          };
          outcome.imports.push(resolved);
        }
        StatementResult::Anomaly(anomaly) => {
          if self.options.verbose {
            warn!(file = %path.display(), "{anomaly}; statement copied verbatim");
          };
          out.push_str(original);
          outcome.anomalies.push(anomaly);
        }
      };
    }
    out.push_str(&text[cursor..]);

    if modified {
      outcome.text = Some(out);
    };
    Ok(outcome)
  }

  fn rewrite_statement(
    &self,
    module_dir: &Path,
    text: &str,
    stmt: Span,
    import: &ImportStmt,
  ) -> StatementResult {
    let spec = import.specifier;
    if !stmt.contains(spec) || spec.0 > spec.1 {
      return StatementResult::Anomaly(StatementRewriteAnomaly::SpecifierOutOfBounds {
        statement: stmt,
        specifier: spec,
      });
    };
    let Some(raw) = text.get(spec.0..spec.1) else {
      return StatementResult::Anomaly(StatementRewriteAnomaly::NotCharBoundary { specifier: spec });
    };
    if raw.contains('\\') {
      return StatementResult::Anomaly(StatementRewriteAnomaly::EscapedSpecifier {
        specifier: raw.to_string(),
      });
    };
    let trimmed = raw.trim();
    if trimmed.is_empty() {
      return StatementResult::Anomaly(StatementRewriteAnomaly::EmptySpecifier { statement: stmt });
    };

    let resolution = resolve(&self.fs, &self.options, module_dir, trimmed);
    let rebuilt = match &resolution {
      Resolution::Rewrite { specifier, .. } => {
        let start = spec.0 + (raw.len() - raw.trim_start().len());
        let end = start + trimmed.len();
        let mut rebuilt = String::with_capacity(stmt.len() + specifier.len() - trimmed.len());
        rebuilt.push_str(&text[stmt.0..start]);
        rebuilt.push_str(specifier);
        rebuilt.push_str(&text[end..stmt.1]);
        Some(rebuilt)
      }
      _ => None,
    };
    StatementResult::Import(
      ResolvedImport {
        specifier: trimmed.to_string(),
        resolution,
      },
      rebuilt,
    )
  }

  /// Rewrites the module at `path` in place. The file is only written if a specifier changed.
  pub fn rewrite(&self, path: &Path) -> Result<RewriteOutcome, RewriteError> {
    let text = self
      .fs
      .read_to_string(path)
      .map_err(|source| RewriteError::FileSystem {
        path: path.to_path_buf(),
        operation: FsOperation::Read,
        source,
      })?;
    let outcome = self.rewrite_text(path, &text)?;
    if let Some(rewritten) = &outcome.text {
      self
        .fs
        .write(path, rewritten)
        .map_err(|source| RewriteError::FileSystem {
          path: path.to_path_buf(),
          operation: FsOperation::Write,
          source,
        })?;
    };
    Ok(outcome)
  }
}
