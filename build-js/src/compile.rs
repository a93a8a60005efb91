use crate::config::ModuleFormat;
use anyhow::bail;
use anyhow::Context;
use anyhow::Result;
use rewrite_js::OutputExtension;
use std::ffi::OsString;
use std::path::Path;
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// One invocation of the compiler over every entry point of a source tree.
#[derive(Clone, Copy, Debug)]
pub struct CompileJob<'a> {
  pub source_dir: &'a Path,
  pub output_dir: &'a Path,
  /// Relative to `source_dir`.
  pub entry_points: &'a [PathBuf],
  pub format: ModuleFormat,
  pub minify: bool,
}

/// Transpiles entry points into `output_dir`, mirroring their layout under `source_dir` and naming
/// each emitted module `<stem>.<format.output_extension()>`.
pub trait Compiler {
  fn compile(&self, job: &CompileJob<'_>) -> Result<()>;
}

/// Drives the `esbuild` executable.
#[derive(Clone, Debug)]
pub struct Esbuild {
  program: PathBuf,
}

impl Esbuild {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
    }
  }
}

impl Default for Esbuild {
  fn default() -> Self {
    Self::new("esbuild")
  }
}

pub fn esbuild_args(job: &CompileJob<'_>) -> Vec<OsString> {
  let mut args: Vec<OsString> = job
    .entry_points
    .iter()
    .map(|entry| job.source_dir.join(entry).into_os_string())
    .collect();

  let mut flag = |name: &str, value: &Path| {
    let mut arg = OsString::from(format!("--{name}="));
    arg.push(value);
    args.push(arg);
  };
  flag("outdir", job.output_dir);
  flag("outbase", job.source_dir);

  args.push(format!("--format={}", job.format).into());
  args.push("--platform=node".into());
  args.push("--target=esnext".into());
  let ext = job.format.output_extension();
  if ext != OutputExtension::Js {
    args.push(format!("--out-extension:.js=.{ext}").into());
  }
  if job.minify {
    args.push("--minify".into());
  }
  args
}

impl Compiler for Esbuild {
  fn compile(&self, job: &CompileJob<'_>) -> Result<()> {
    let args = esbuild_args(job);
    debug!(program = %self.program.display(), ?args, "spawning compiler");
    let output = Command::new(&self.program)
      .args(&args)
      .output()
      .with_context(|| format!("spawn compiler at {}", self.program.display()))?;
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !output.status.success() {
      bail!(
        "{} exited with {}: {}",
        self.program.display(),
        output.status,
        stderr.trim()
      );
    }
    if !stderr.trim().is_empty() {
      debug!("{}", stderr.trim());
    }
    Ok(())
  }
}
