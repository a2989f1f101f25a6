//! Serde shapes of a suite file.
//!
//! ```yaml
//! - let: { x: 42 }
//! - before_each:
//!     - let: { obj: { x: 1 } }
//! - describe: "objects"
//!   body:
//!     - it: "reads a field"
//!       steps:
//!         - equal: [$obj.x, 1]
//! ```

use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EntryDoc {
    Describe(DescribeDoc),
    Case(CaseDoc),
    Hook(HookDoc),
    Let(LetDoc),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DescribeDoc {
    pub describe: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub only: bool,
    #[serde(default)]
    pub body: Vec<EntryDoc>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CaseDoc {
    pub it: String,
    #[serde(default)]
    pub skip: bool,
    #[serde(default)]
    pub only: bool,
    #[serde(default)]
    pub steps: Vec<serde_yaml::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HookDoc {
    pub before_each: Vec<serde_yaml::Value>,
}

/// Registration-time bindings, visible to everything declared after them.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LetDoc {
    #[serde(rename = "let")]
    pub bindings: serde_yaml::Mapping,
}
