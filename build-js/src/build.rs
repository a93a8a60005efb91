use crate::compile::CompileJob;
use crate::compile::Compiler;
use crate::compile::Esbuild;
use crate::config::BuildConfig;
use crate::config::ModuleFormat;
use crate::discover::discover_modules;
use crate::discover::discover_sources;
use crate::discover::emitted_module_path;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use rewrite_js::rewrite_modules;
use rewrite_js::ImportRewriter;
use rewrite_js::RewriteOptions;
use rewrite_js::RewriteReport;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tracing::info;

#[derive(Clone, Debug, Serialize)]
pub struct BuildReport {
  pub format: ModuleFormat,
  /// Assets copied verbatim, relative to the output directory.
  pub copied: Vec<PathBuf>,
  /// Emitted modules, relative to the output directory.
  pub compiled: Vec<PathBuf>,
  /// Present only for formats whose relative imports needed fixing.
  pub rewrite: Option<RewriteReport>,
}

pub fn build(config: &BuildConfig) -> Result<BuildReport> {
  build_with(config, &Esbuild::new(&config.compiler))
}

pub fn build_with(config: &BuildConfig, compiler: &dyn Compiler) -> Result<BuildReport> {
  let tree = discover_sources(&config.source_dir, &config.source_extensions)?;
  info!(
    entry_points = tree.entry_points.len(),
    assets = tree.assets.len(),
    "discovered {}",
    config.source_dir.display()
  );

  prepare_output_dir(
    &config.source_dir,
    &config.output_dir,
    config.clear_previous_build,
  )?;
  copy_assets(&config.source_dir, &config.output_dir, &tree.assets)?;

  let extension = config.format.output_extension();
  let compiled: Vec<PathBuf> = tree
    .entry_points
    .iter()
    .map(|entry| emitted_module_path(entry, extension))
    .collect();
  if !tree.entry_points.is_empty() {
    compiler
      .compile(&CompileJob {
        source_dir: &config.source_dir,
        output_dir: &config.output_dir,
        entry_points: &tree.entry_points,
        format: config.format,
        minify: config.minify,
      })
      .with_context(|| format!("compile {}", config.source_dir.display()))?;
    info!(modules = compiled.len(), "compiled to {}", config.output_dir.display());
  }

  // Runs only after every module is emitted and every asset copied.
  let rewrite = config.format.requires_explicit_extensions().then(|| {
    let rewriter = ImportRewriter::new(config.rewrite_options());
    rewrite_modules(&rewriter, &config.output_dir, &compiled)
  });

  Ok(BuildReport {
    format: config.format,
    copied: tree.assets,
    compiled,
    rewrite,
  })
}

/// Rewrites every module already present under `output_dir`.
pub fn fix_imports(output_dir: &Path, options: RewriteOptions) -> Result<RewriteReport> {
  let modules = discover_modules(output_dir, options.extension)?;
  info!(modules = modules.len(), "fixing imports under {}", output_dir.display());
  let rewriter = ImportRewriter::new(options);
  Ok(rewrite_modules(&rewriter, output_dir, &modules))
}

/// Clears (when asked) and creates the output directory.
///
/// Refuses output directories that are, or contain, the source directory: clearing them would
/// delete the sources and copying assets would overwrite them in place.
pub fn prepare_output_dir(source_dir: &Path, output_dir: &Path, clear: bool) -> Result<()> {
  if output_dir.exists() {
    let source = fs::canonicalize(source_dir)
      .with_context(|| format!("resolve {}", source_dir.display()))?;
    let output = fs::canonicalize(output_dir)
      .with_context(|| format!("resolve {}", output_dir.display()))?;
    if source.starts_with(&output) {
      bail!(
        "output directory {} contains the source directory {}",
        output_dir.display(),
        source_dir.display()
      );
    }
    if clear {
      fs::remove_dir_all(output_dir)
        .with_context(|| format!("clear {}", output_dir.display()))?;
      info!("cleared {}", output_dir.display());
    }
  }
  fs::create_dir_all(output_dir).with_context(|| format!("create {}", output_dir.display()))
}

fn copy_assets(source_dir: &Path, output_dir: &Path, assets: &[PathBuf]) -> Result<()> {
  for rel in assets {
    let from = source_dir.join(rel);
    let to = output_dir.join(rel);
    if let Some(parent) = to.parent() {
      fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::copy(&from, &to)
      .with_context(|| format!("copy {} to {}", from.display(), to.display()))?;
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use rewrite_js::ModuleStatus;
  use rewrite_js::OutputExtension;
  use std::cell::Cell;
  use tempfile::tempdir;

  /// Emits every entry point with its source text unchanged.
  #[derive(Default)]
  struct CopyCompiler {
    calls: Cell<usize>,
  }

  impl Compiler for CopyCompiler {
    fn compile(&self, job: &CompileJob<'_>) -> Result<()> {
      self.calls.set(self.calls.get() + 1);
      for entry in job.entry_points {
        let to = job
          .output_dir
          .join(emitted_module_path(entry, job.format.output_extension()));
        fs::create_dir_all(to.parent().unwrap())?;
        fs::copy(job.source_dir.join(entry), to)?;
      }
      Ok(())
    }
  }

  fn write(root: &Path, rel: &str, text: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, text).unwrap();
  }

  #[test]
  fn esm_build_fixes_relative_imports() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("build");
    write(&src, "index.ts", "import { f } from \"./util\";\nimport { g } from \"pkg\";\nf(g);\n");
    write(&src, "util/index.ts", "export { f } from \"../helpers\";\n");
    write(&src, "helpers.ts", "export const f = (x) => x;\n");
    write(&src, "data.json", "{}");
    write(&out, "stale.txt", "old");

    let config = BuildConfig::new(&src, &out).with_format(ModuleFormat::Esm);
    let compiler = CopyCompiler::default();
    let report = build_with(&config, &compiler).unwrap();

    assert_eq!(compiler.calls.get(), 1);
    assert_eq!(report.copied, vec![PathBuf::from("data.json")]);
    assert_eq!(report.compiled, vec![
      PathBuf::from("helpers.mjs"),
      PathBuf::from("index.mjs"),
      PathBuf::from("util/index.mjs"),
    ]);
    let rewrite = report.rewrite.unwrap();
    assert_eq!(rewrite.rewritten(), 2);
    assert_eq!(rewrite.failures().count(), 0);
    assert!(!out.join("stale.txt").exists());
    assert_eq!(fs::read_to_string(out.join("data.json")).unwrap(), "{}");
    assert_eq!(
      fs::read_to_string(out.join("index.mjs")).unwrap(),
      "import { f } from \"./util/index.mjs\";\nimport { g } from \"pkg\";\nf(g);\n"
    );
    assert_eq!(
      fs::read_to_string(out.join("util/index.mjs")).unwrap(),
      "export { f } from \"../helpers.mjs\";\n"
    );
  }

  #[test]
  fn cjs_build_skips_rewrite() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("build");
    write(&src, "index.ts", "import { f } from \"./util\";\n");
    write(&src, "util.ts", "export const f = 1;\n");

    let report = build_with(&BuildConfig::new(&src, &out), &CopyCompiler::default()).unwrap();
    assert!(report.rewrite.is_none());
    assert_eq!(
      fs::read_to_string(out.join("index.js")).unwrap(),
      "import { f } from \"./util\";\n"
    );
  }

  #[test]
  fn asset_only_tree_never_invokes_compiler() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    let out = tmp.path().join("build");
    write(&src, "nested/readme.md", "# hi");
    write(&out, "keep.txt", "kept");

    let compiler = CopyCompiler::default();
    let config = BuildConfig::new(&src, &out)
      .with_format(ModuleFormat::Esm)
      .with_clear_previous_build(false);
    let report = build_with(&config, &compiler).unwrap();
    assert_eq!(compiler.calls.get(), 0);
    assert!(report.compiled.is_empty());
    assert_eq!(report.rewrite.unwrap().modules.len(), 0);
    assert!(out.join("keep.txt").exists());
    assert!(out.join("nested/readme.md").exists());
  }

  #[test]
  fn refuses_output_containing_sources() {
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    write(&src, "index.ts", "");
    for out in [src.clone(), tmp.path().to_path_buf()] {
      let err = build_with(&BuildConfig::new(&src, &out), &CopyCompiler::default()).unwrap_err();
      assert!(err.to_string().contains("contains the source directory"));
    }
    assert!(src.join("index.ts").exists());
  }

  #[test]
  fn compiler_failure_aborts_build() {
    struct FailingCompiler;
    impl Compiler for FailingCompiler {
      fn compile(&self, _job: &CompileJob<'_>) -> Result<()> {
        bail!("esbuild exited with exit status: 1")
      }
    }
    let tmp = tempdir().unwrap();
    let src = tmp.path().join("src");
    write(&src, "index.ts", "");
    let err = build_with(&BuildConfig::new(&src, tmp.path().join("out")), &FailingCompiler)
      .unwrap_err();
    assert!(format!("{err:#}").contains("esbuild exited"));
  }

  #[test]
  fn fix_imports_walks_existing_output() {
    let tmp = tempdir().unwrap();
    write(tmp.path(), "a.mjs", "import \"./b\";");
    write(tmp.path(), "b.mjs", "import \"./broken\" x");
    let report = fix_imports(tmp.path(), RewriteOptions::new(OutputExtension::Mjs)).unwrap();
    assert_eq!(report.modules.len(), 2);
    assert_eq!(report.modules[0].status, ModuleStatus::Rewritten { imports: 1 });
    assert!(matches!(report.modules[1].status, ModuleStatus::ParseFailed { .. }));
    assert_eq!(fs::read_to_string(tmp.path().join("a.mjs")).unwrap(), "import \"./b.mjs\";");
  }
}
