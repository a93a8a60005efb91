use serde::Serialize;

/// Version of every JSON document the CLI prints.
pub const SCHEMA_VERSION: u32 = 1;

#[derive(Serialize)]
struct Versioned<'a, T> {
  schema_version: u32,
  #[serde(flatten)]
  body: &'a T,
}

pub fn to_json<T: Serialize>(body: &T) -> serde_json::Result<String> {
  serde_json::to_string(&Versioned {
    schema_version: SCHEMA_VERSION,
    body,
  })
}

#[cfg(test)]
mod tests {
  use super::*;
  use rewrite_js::ModuleReport;
  use rewrite_js::ModuleStatus;
  use rewrite_js::RewriteReport;
  use serde_json::json;
  use serde_json::Value;
  use std::path::PathBuf;

  #[test]
  fn prefixes_schema_version() {
    let report = RewriteReport {
      modules: vec![ModuleReport {
        path: PathBuf::from("a.mjs"),
        status: ModuleStatus::Unchanged,
      }],
    };
    let value: Value = serde_json::from_str(&to_json(&report).unwrap()).unwrap();
    assert_eq!(
      value,
      json!({
        "schema_version": 1,
        "modules": [{ "path": "a.mjs", "status": "unchanged" }],
      })
    );
  }
}
