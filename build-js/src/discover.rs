use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use rewrite_js::OutputExtension;
use std::path::Path;
use std::path::PathBuf;
use walkdir::WalkDir;

/// Files under a source directory, relative to it and sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SourceTree {
  /// Compiled to modules.
  pub entry_points: Vec<PathBuf>,
  /// Copied verbatim.
  pub assets: Vec<PathBuf>,
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
  path
    .extension()
    .and_then(|ext| ext.to_str())
    .is_some_and(|ext| extensions.iter().any(|e| e == ext))
}

// Declaration files (`x.d.ts`) have nothing to emit.
fn is_declaration(path: &Path) -> bool {
  path
    .file_stem()
    .and_then(|stem| stem.to_str())
    .is_some_and(|stem| stem.ends_with(".d"))
}

fn relative_files(root: &Path) -> Result<Vec<PathBuf>> {
  let mut out = Vec::new();
  for entry in WalkDir::new(root).sort_by_file_name() {
    let entry = entry.with_context(|| format!("walk {}", root.display()))?;
    if !entry.file_type().is_file() {
      continue;
    }
    let rel = entry
      .path()
      .strip_prefix(root)
      .with_context(|| format!("{} is outside {}", entry.path().display(), root.display()))?;
    out.push(rel.to_path_buf());
  }
  Ok(out)
}

pub fn discover_sources(source_dir: &Path, source_extensions: &[String]) -> Result<SourceTree> {
  if !source_dir.is_dir() {
    bail!("source directory not found at {}", source_dir.display());
  }
  let mut tree = SourceTree::default();
  for rel in relative_files(source_dir)? {
    if has_extension(&rel, source_extensions) && !is_declaration(&rel) {
      tree.entry_points.push(rel);
    } else {
      tree.assets.push(rel);
    }
  }
  Ok(tree)
}

/// Where the compiler emits the module for `entry_point`, relative to the output directory.
pub fn emitted_module_path(entry_point: &Path, extension: OutputExtension) -> PathBuf {
  entry_point.with_extension(extension.as_str())
}

/// Every module with `extension` under an existing output tree, relative to it.
pub fn discover_modules(output_dir: &Path, extension: OutputExtension) -> Result<Vec<PathBuf>> {
  if !output_dir.is_dir() {
    bail!("output directory not found at {}", output_dir.display());
  }
  let extensions = [extension.as_str().to_string()];
  Ok(
    relative_files(output_dir)?
      .into_iter()
      .filter(|rel| has_extension(rel, &extensions))
      .collect(),
  )
}
