use anyhow::Context;
use anyhow::Result;
use build_js::build;
use build_js::fix_imports;
use build_js::report::to_json;
use build_js::BuildConfig;
use build_js::BuildReport;
use build_js::ModuleFormat;
use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use rewrite_js::OutputExtension;
use rewrite_js::RewriteOptions;
use rewrite_js::RewriteReport;
use scan_js::statement::Statement;
use serde::Serialize;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
  name = "build-js",
  version,
  about = "Builds a TypeScript source tree into runnable JavaScript"
)]
struct Cli {
  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Transpile a source tree, copy its other files, and fix relative imports of ESM output.
  Build(BuildArgs),
  /// Fix relative imports of an already emitted output tree.
  Fix(FixArgs),
  /// Print the top-level statements of a module as JSON.
  Inspect {
    file: PathBuf,
  },
}

#[derive(Args)]
struct BuildArgs {
  /// Source directory.
  #[arg(short, long = "src", default_value = "src")]
  source: PathBuf,

  /// Output directory.
  #[arg(short, long = "out", default_value = "build")]
  output: PathBuf,

  /// Module format to emit.
  #[arg(short, long, value_enum, default_value_t = ModuleFormat::Cjs)]
  format: ModuleFormat,

  /// Minify emitted code.
  #[arg(short, long)]
  minify: bool,

  /// Delete the output directory before building.
  #[arg(
    short = 'd',
    long = "clear",
    action = ArgAction::Set,
    default_value_t = true,
    value_name = "true|false"
  )]
  clear: bool,

  /// Log every scanned and rewritten module.
  #[arg(short, long)]
  verbose: bool,

  /// Extensions of files to compile; all other files are copied.
  #[arg(long = "source-ext", value_name = "EXT", default_values = ["ts", "tsx"])]
  source_extensions: Vec<String>,

  /// Compiler executable.
  #[arg(long, default_value = "esbuild")]
  compiler: PathBuf,

  /// Print a JSON report to stdout.
  #[arg(long)]
  json: bool,
}

#[derive(Args)]
struct FixArgs {
  /// Output directory to rewrite in place.
  dir: PathBuf,

  /// Extension of the emitted modules.
  #[arg(long, default_value = "mjs", value_name = "js|mjs|cjs")]
  ext: OutputExtension,

  /// Join adjacent statements without a newline.
  #[arg(short, long)]
  minify: bool,

  #[arg(short, long)]
  verbose: bool,

  /// Extensions of untranspiled sources that may be left next to emitted modules.
  #[arg(long = "source-ext", value_name = "EXT", default_values = ["ts", "tsx"])]
  source_extensions: Vec<String>,

  #[arg(long)]
  json: bool,
}

#[derive(Serialize)]
struct InspectOutput<'a> {
  file: &'a Path,
  statements: Vec<Statement>,
}

fn init_tracing(verbose: bool) {
  let default = if verbose { "info" } else { "error" };
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
  if let Err(err) = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init()
  {
    eprintln!("failed to install tracing subscriber: {err}");
  }
}

fn print_rewrite_summary(report: &RewriteReport) {
  println!(
    "rewrote {} of {} module(s), {} failed",
    report.rewritten(),
    report.modules.len(),
    report.failures().count()
  );
}

fn run_build(args: BuildArgs) -> Result<()> {
  init_tracing(args.verbose);
  let config = BuildConfig::new(args.source, args.output)
    .with_format(args.format)
    .with_minify(args.minify)
    .with_clear_previous_build(args.clear)
    .with_verbose(args.verbose)
    .with_source_extensions(args.source_extensions)
    .with_compiler(args.compiler);
  let report: BuildReport = build(&config)?;
  if args.json {
    println!("{}", to_json(&report)?);
    return Ok(());
  }
  println!(
    "copied {} file(s), compiled {} module(s) to {}",
    report.copied.len(),
    report.compiled.len(),
    config.output_dir.display()
  );
  if let Some(rewrite) = &report.rewrite {
    print_rewrite_summary(rewrite);
  }
  Ok(())
}

fn run_fix(args: FixArgs) -> Result<()> {
  init_tracing(args.verbose);
  let options = RewriteOptions::new(args.ext)
    .with_minify(args.minify)
    .with_verbose(args.verbose)
    .with_source_extensions(args.source_extensions);
  let report = fix_imports(&args.dir, options)?;
  if args.json {
    println!("{}", to_json(&report)?);
  } else {
    print_rewrite_summary(&report);
  }
  Ok(())
}

fn run_inspect(file: &Path) -> Result<()> {
  let source = fs::read_to_string(file).with_context(|| format!("read {}", file.display()))?;
  let statements =
    scan_js::inspect(&source).with_context(|| format!("failed to parse {}", file.display()))?;
  println!("{}", to_json(&InspectOutput { file, statements })?);
  Ok(())
}

fn main() -> ExitCode {
  let cli = Cli::parse();
  let result = match cli.command {
    Command::Build(args) => run_build(args),
    Command::Fix(args) => run_fix(args),
    Command::Inspect { file } => run_inspect(&file),
  };
  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      eprintln!("error: {err:#}");
      ExitCode::from(1)
    }
  }
}
