use rewrite_js::rewrite_modules;
use rewrite_js::ImportRewriter;
use rewrite_js::ModuleStatus;
use rewrite_js::OutputExtension;
use rewrite_js::RewriteOptions;
use serde_json::json;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use tempfile::tempdir;

fn write(root: &Path, rel: &str, text: &str) {
  let path = root.join(rel);
  fs::create_dir_all(path.parent().unwrap()).unwrap();
  fs::write(path, text).unwrap();
}

#[test]
fn rewrites_output_tree_and_isolates_failures() {
  let tmp = tempdir().unwrap();
  let root = tmp.path();
  write(root, "index.mjs", "import { f } from \"./util\";\nimport { g } from \"pkg\";\nf(g);\n");
  write(root, "util/index.mjs", "export * from \"../helpers\";\n");
  write(root, "helpers.mjs", "export const f = (x) => x;\n");
  write(root, "broken.mjs", "import a from \"./helpers\" nope\n");
  write(root, "plain.mjs", "console.log(1);\n");
  let modified = fs::metadata(root.join("plain.mjs")).unwrap().modified().unwrap();

  let rewriter = ImportRewriter::new(RewriteOptions::new(OutputExtension::Mjs));
  let modules: Vec<PathBuf> = [
    "index.mjs",
    "util/index.mjs",
    "helpers.mjs",
    "broken.mjs",
    "missing.mjs",
    "plain.mjs",
  ]
  .iter()
  .map(PathBuf::from)
  .collect();
  let report = rewrite_modules(&rewriter, root, &modules);

  let statuses: Vec<_> = report.modules.iter().map(|m| m.status.clone()).collect();
  assert_eq!(statuses[0], ModuleStatus::Rewritten { imports: 1 });
  assert_eq!(statuses[1], ModuleStatus::Rewritten { imports: 1 });
  assert_eq!(statuses[2], ModuleStatus::Unchanged);
  assert!(matches!(statuses[3], ModuleStatus::ParseFailed { .. }));
  assert!(matches!(statuses[4], ModuleStatus::FileSystemFailed { .. }));
  assert_eq!(statuses[5], ModuleStatus::Unchanged);
  assert_eq!(report.rewritten(), 2);
  assert_eq!(report.unchanged(), 2);
  assert_eq!(report.failures().count(), 2);

  assert_eq!(
    fs::read_to_string(root.join("index.mjs")).unwrap(),
    "import { f } from \"./util/index.mjs\";\nimport { g } from \"pkg\";\nf(g);\n"
  );
  assert_eq!(
    fs::read_to_string(root.join("util/index.mjs")).unwrap(),
    "export * from \"../helpers.mjs\";\n"
  );
  assert_eq!(
    fs::read_to_string(root.join("broken.mjs")).unwrap(),
    "import a from \"./helpers\" nope\n"
  );
  assert_eq!(
    fs::metadata(root.join("plain.mjs")).unwrap().modified().unwrap(),
    modified
  );

  // A second pass finds nothing left to do.
  let again = rewrite_modules(&rewriter, root, &modules[..3]);
  assert_eq!(again.rewritten(), 0);
  assert_eq!(again.unchanged(), 3);
}

#[test]
fn report_serializes_status_per_module() {
  let tmp = tempdir().unwrap();
  write(tmp.path(), "a.js", "import \"./b\";");
  write(tmp.path(), "b.js", "");
  let rewriter = ImportRewriter::new(RewriteOptions::new(OutputExtension::Js));
  let report = rewrite_modules(&rewriter, tmp.path(), &[PathBuf::from("a.js")]);
  assert_eq!(
    serde_json::to_value(&report).unwrap(),
    json!({ "modules": [{ "path": "a.js", "status": "rewritten", "imports": 1 }] })
  );
  assert_eq!(fs::read_to_string(tmp.path().join("a.js")).unwrap(), "import \"./b.js\";");
}
