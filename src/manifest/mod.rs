//! YAML manifests: a list of shell-command tests plus shared shell settings.
//!
//! ```yaml
//! config:
//!   env: {DATABASE_URL: "sqlite::memory:"}
//! tests:
//!   - group: db
//!     name: migrates
//!     run: ./migrate.sh
//!   - group: api
//!     after: [db]
//!     name: serves
//!     title: API answers health checks
//!     run: curl -sf localhost:8080/health
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::declare::{DeclToken, Declaration};
use crate::runner::action::{ShellAction, ShellConfig};

#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// One test entry of a manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub after: Option<Vec<String>>,
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    pub run: String,
}

impl ManifestEntry {
    /// The declaration tokens this entry stands for.
    pub fn tokens(&self) -> Vec<DeclToken> {
        let mut tokens = Vec::with_capacity(2);
        if let Some(group) = &self.group {
            tokens.push(DeclToken::Group(group.clone()));
        }
        if let Some(after) = &self.after {
            tokens.push(DeclToken::After(after.clone()));
        }
        tokens
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub config: ShellConfig,
    #[serde(default)]
    pub tests: Vec<ManifestEntry>,
}

impl Manifest {
    /// Parse a manifest from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError::Parse`] if the text is not a valid manifest.
    pub fn parse(input: &str, path: &Path) -> Result<Self, ManifestError> {
        serde_yaml::from_str(input).map_err(|source| ManifestError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a manifest file. A relative `working_dir` is resolved
    /// against the directory holding the manifest.
    ///
    /// # Errors
    ///
    /// Returns [`ManifestError`] if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let input = fs::read_to_string(path).map_err(|source| ManifestError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let mut manifest = Self::parse(&input, path)?;

        if manifest.config.working_dir.is_relative() {
            let base = path.parent().unwrap_or_else(|| Path::new("."));
            manifest.config.working_dir = base.join(&manifest.config.working_dir);
        }

        tracing::debug!(
            path = %path.display(),
            tests = manifest.tests.len(),
            "loaded manifest"
        );
        Ok(manifest)
    }

    /// Turn every entry into a declaration backed by a [`ShellAction`].
    pub fn declarations(&self) -> Vec<Declaration> {
        self.tests
            .iter()
            .map(|entry| {
                let action = ShellAction::new(entry.run.clone(), self.config.clone());
                let declaration = Declaration::new(entry.tokens(), entry.name.clone(), action);
                match &entry.title {
                    Some(title) => declaration.with_title(title.clone()),
                    None => declaration,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::declare::BuildError;
    use crate::graph::builder::build;
    use std::io::Write;

    const SUITE: &str = r#"
config:
  env:
    MODE: test
tests:
  - group: db
    name: migrates
    run: "true"
  - group: api
    after: [db]
    name: serves
    title: API answers
    run: "true"
"#;

    fn parse(input: &str) -> Result<Manifest, ManifestError> {
        Manifest::parse(input, Path::new("suite.yaml"))
    }

    #[test]
    fn parse_entries_and_config() {
        let manifest = parse(SUITE).unwrap();
        assert_eq!(manifest.tests.len(), 2);
        assert_eq!(manifest.config.env.get("MODE").map(String::as_str), Some("test"));
        assert_eq!(manifest.config.shell, "/bin/sh");
        assert_eq!(manifest.tests[1].after, Some(vec!["db".to_string()]));
        assert_eq!(manifest.tests[1].title.as_deref(), Some("API answers"));
    }

    #[test]
    fn entry_tokens() {
        let manifest = parse(SUITE).unwrap();
        assert_eq!(
            manifest.tests[1].tokens(),
            vec![
                DeclToken::Group("api".into()),
                DeclToken::After(vec!["db".into()])
            ]
        );
        assert_eq!(manifest.tests[0].tokens(), vec![DeclToken::Group("db".into())]);
    }

    #[test]
    fn declarations_build_a_graph() {
        let graph = build(parse(SUITE).unwrap().declarations()).unwrap();
        assert_eq!(graph.order(), ["db", "api"]);
        assert_eq!(graph.group("api").unwrap().tests()[0].title, "API answers");
        assert_eq!(graph.group("db").unwrap().tests()[0].title, "migrates");
    }

    #[test]
    fn entry_without_group_fails_build() {
        let manifest = parse("tests:\n  - name: orphan\n    run: \"true\"\n").unwrap();
        let err = build(manifest.declarations()).unwrap_err();
        assert!(matches!(err, BuildError::MissingGroup(_)));
    }

    #[test]
    fn empty_manifest_has_no_tests() {
        let manifest = parse("{}").unwrap();
        assert!(manifest.tests.is_empty());
        assert_eq!(manifest.config, ShellConfig::default());
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = parse("tests:\n  - name: t\n    run: x\n    retries: 3\n").unwrap_err();
        assert!(matches!(err, ManifestError::Parse { .. }));
        assert!(err.to_string().starts_with("failed to parse suite.yaml"));

        assert!(parse("config:\n  timeout: 5\n").is_err());
    }

    #[test]
    fn rejects_entry_without_command() {
        assert!(parse("tests:\n  - group: a\n    name: t\n").is_err());
    }

    #[test]
    fn load_resolves_working_dir_against_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.yaml");
        let mut file = fs::File::create(&path).unwrap();
        write!(file, "config:\n  working_dir: scripts\ntests: []\n").unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.config.working_dir, dir.path().join("scripts"));
    }

    #[test]
    fn load_keeps_absolute_working_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("suite.yaml");
        fs::write(&path, "config:\n  working_dir: /tmp\n").unwrap();

        let manifest = Manifest::load(&path).unwrap();
        assert_eq!(manifest.config.working_dir, PathBuf::from("/tmp"));
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let err = Manifest::load(Path::new("/nonexistent/arbor.yaml")).unwrap_err();
        assert!(matches!(err, ManifestError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/arbor.yaml"));
    }
}
