//! YAML suite files.
//!
//! A suite file is a YAML sequence of entries (`let`, `before_each`,
//! `describe`, `it`). Loading discovers the files, parses each into
//! [`document::EntryDoc`]s and compiles them into one [`Suite`] whose
//! fixture is a [`Scope`]: the names bound by `let` steps of the running
//! case and its hooks.
//!
//! Each file becomes a top-level suite named after its path, under an
//! unnamed root.
//!
//! ```rust
//! use suitecase::config::RunConfig;
//! use suitecase::runner::Runner;
//! use suitecase::script;
//!
//! let suite = script::load_str(
//!     "inline.yaml",
//!     r#"
//! - it: "adds up"
//!   steps:
//!     - let: { total: 3 }
//!     - equal: [$total, 3]
//! "#,
//! )
//! .unwrap();
//! let report = Runner::new(&RunConfig::default()).run(&suite);
//! assert!(report.is_success());
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::errors::RegistrationError;
use crate::suite::Suite;

pub mod compile;
pub mod document;
pub mod eval;
pub mod reference;
pub mod step;

pub use eval::{Bindings, Scope};

use document::EntryDoc;

// ============================================================================
// DISCOVERY
// ============================================================================

/// Finds suite files under `root`, sorted by path.
///
/// A `root` that is itself a file is returned as is, whatever its extension.
pub fn discover_yaml_files<P: AsRef<Path>>(root: P) -> Vec<PathBuf> {
    let root = root.as_ref();
    if root.is_file() {
        return vec![root.to_path_buf()];
    }
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|e| match e {
            Ok(entry) => Some(entry),
            Err(err) => {
                warn!(root = %root.display(), error = %err, "skipping unreadable path");
                None
            }
        })
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    files.sort();
    files
}

// ============================================================================
// LOADING
// ============================================================================

/// Parses the entries of one suite file. An empty file has no entries.
pub fn parse_document(file: &str, content: &str) -> Result<Vec<EntryDoc>, RegistrationError> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_yaml::from_str::<Option<Vec<EntryDoc>>>(content)
        .map(Option::unwrap_or_default)
        .map_err(|e| {
            let offset = e.location().map(|at| at.index());
            RegistrationError::parse(file, content, e.to_string(), offset)
        })
}

/// Builds a suite tree from a single in-memory file.
pub fn load_str(name: &str, content: &str) -> Result<Suite<Scope>, RegistrationError> {
    let entries = parse_document(name, content)?;
    Suite::build("", |root| {
        root.describe_with(name.to_string(), Default::default(), |suite| {
            compile::compile_entries(suite, entries, Bindings::new())
        });
    })
}

/// Discovers, parses and registers every suite file under `paths`.
pub fn load_paths(paths: &[PathBuf]) -> Result<Suite<Scope>, RegistrationError> {
    let files: Vec<PathBuf> = paths.iter().flat_map(discover_yaml_files).collect();
    if files.is_empty() {
        let searched = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        return Err(RegistrationError::NoSuiteFiles(searched));
    }

    let mut documents = Vec::with_capacity(files.len());
    for path in &files {
        let name = path.display().to_string();
        let content = fs::read_to_string(path).map_err(|source| RegistrationError::Io {
            path: name.clone(),
            source,
        })?;
        let entries = parse_document(&name, &content)?;
        debug!(file = %name, entries = entries.len(), "parsed suite file");
        documents.push((name, entries));
    }

    let suite = Suite::build("", |root| {
        for (name, entries) in documents {
            if root.is_rejected() {
                break;
            }
            root.describe_with(name, Default::default(), |suite| {
                compile::compile_entries(suite, entries, Bindings::new())
            });
        }
    })?;
    info!(
        files = files.len(),
        cases = suite.case_count(),
        "registered suites"
    );
    Ok(suite)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_files_register_nothing() {
        let suite = load_str("empty.yaml", "\n# nothing here\n").unwrap();
        assert_eq!(suite.case_count(), 0);
    }

    #[test]
    fn malformed_yaml_points_into_the_source() {
        let err = load_str("bad.yaml", "- it: [unclosed\n").unwrap_err();
        assert!(matches!(err, RegistrationError::Parse { .. }));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let err = load_str("bad.yaml", "- it: x\n  stepz: []\n").unwrap_err();
        assert!(matches!(err, RegistrationError::Parse { .. }));
    }

    #[test]
    fn skip_and_only_together_are_rejected() {
        let err = load_str("bad.yaml", "- it: x\n  skip: true\n  only: true\n").unwrap_err();
        assert!(matches!(err, RegistrationError::InvalidStep { .. }));
    }

    #[test]
    fn walk_errors_are_skipped_not_fatal() {
        assert!(discover_yaml_files("does/not/exist").is_empty());
    }

    #[test]
    fn missing_paths_report_no_suite_files() {
        let err = load_paths(&[PathBuf::from("does/not/exist")]).unwrap_err();
        assert!(matches!(err, RegistrationError::NoSuiteFiles(_)));
    }
}
